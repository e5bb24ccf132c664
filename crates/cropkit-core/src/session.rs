//! Interactive crop session state machine.
//!
//! One `CropSession` spans one open crop dialog: source image, pan, zoom,
//! rotation, and the state transitions around save and cancel. The original
//! flows kept these as independent mutable variables per call site; here they
//! are one value object so the transitions can be checked.
//!
//! # State Machine
//!
//! ```text
//! Idle --load--> Editing --save--> Saving --ok--> Consumed
//!                  ^  |                |
//!                  |  +--cancel--> Cancelled
//!                  +------failure------+
//! ```
//!
//! Consumed and Cancelled are terminal. A failed save (decode, empty region,
//! encode) returns to Editing with the source intact so the user can retry
//! without re-selecting the file. Only one save can be in flight: `save`
//! outside Editing is rejected with `InvalidState`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::{decode_image, DecodeError, SourceImage};
use crate::encode::DEFAULT_JPEG_QUALITY;
use crate::pipeline::{
    clamp_zoom, compute_cropped_image_with_quality, normalize_rotation, CropError, CropRegion,
    CroppedArtifact,
};

/// Per-use-case crop configuration.
///
/// The zoom bounds intentionally differ between presets; the product used
/// [1, 2] for avatars and [1, 3] for documents, and neither is more correct
/// than the other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropConfig {
    /// Fixed aspect ratio (width / height) enforced on the crop rectangle,
    /// or None for a free rectangle.
    pub aspect: Option<f64>,
    /// Lower zoom bound (floor prevents the crop window from outgrowing the
    /// image).
    pub min_zoom: f64,
    /// Upper zoom bound.
    pub max_zoom: f64,
    /// JPEG quality for the saved artifact.
    pub jpeg_quality: u8,
}

impl CropConfig {
    /// Square avatar crop, zoom 1-2.
    pub fn avatar() -> Self {
        Self {
            aspect: Some(1.0),
            min_zoom: 1.0,
            max_zoom: 2.0,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// 4:5 portrait crop used for practitioner profile photos, zoom 1-2.
    pub fn portrait() -> Self {
        Self {
            aspect: Some(4.0 / 5.0),
            min_zoom: 1.0,
            max_zoom: 2.0,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Free-aspect document scan crop, zoom 1-3.
    pub fn document() -> Self {
        Self {
            aspect: None,
            min_zoom: 1.0,
            max_zoom: 3.0,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// On-screen crop window size in display pixels.
///
/// Only the ratio between viewport and source matters; the resolved region
/// is the same at any display resolution for the same pan/zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Lifecycle state of a crop session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No source loaded yet.
    Idle,
    /// Source loaded, user adjusting pan/zoom/rotation.
    Editing,
    /// Save in flight.
    Saving,
    /// Artifact produced and handed to the caller.
    Consumed,
    /// User aborted; no artifact.
    Cancelled,
}

impl SessionState {
    /// Terminal states accept no further operations.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Consumed | SessionState::Cancelled)
    }
}

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The operation is not allowed in the current state.
    #[error("Operation not allowed in state {state:?}")]
    InvalidState { state: SessionState },

    /// No source image is loaded.
    #[error("No source image loaded")]
    NoSource,

    /// Source decoding failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The crop pipeline failed.
    #[error(transparent)]
    Crop(#[from] CropError),
}

/// Transient state for one interactive crop operation.
#[derive(Debug, Clone)]
pub struct CropSession {
    config: CropConfig,
    state: SessionState,
    source: Option<SourceImage>,
    pan_x: f64,
    pan_y: f64,
    zoom: f64,
    rotation_degrees: f64,
    last_region: Option<CropRegion>,
}

impl CropSession {
    /// Start an idle session with the given configuration.
    pub fn new(config: CropConfig) -> Self {
        let config = CropConfig {
            max_zoom: config.max_zoom.max(config.min_zoom),
            ..config
        };
        Self {
            config,
            state: SessionState::Idle,
            source: None,
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: config.min_zoom,
            rotation_degrees: 0.0,
            last_region: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn rotation_degrees(&self) -> f64 {
        self.rotation_degrees
    }

    pub fn pan(&self) -> (f64, f64) {
        (self.pan_x, self.pan_y)
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    /// The most recently resolved crop region, if any.
    pub fn last_region(&self) -> Option<&CropRegion> {
        self.last_region.as_ref()
    }

    /// Decode image bytes and enter Editing.
    ///
    /// Allowed in Idle (first load) and Editing (user picks a different
    /// file). On decode failure the session is left exactly as it was: an
    /// Editing session keeps its previous source.
    pub fn load_source_bytes(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Idle | SessionState::Editing) {
            return Err(SessionError::InvalidState { state: self.state });
        }
        let image = decode_image(bytes)?;
        self.accept_source(image);
        Ok(())
    }

    /// Load an already-decoded source and enter Editing.
    pub fn load_source(&mut self, image: SourceImage) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Idle | SessionState::Editing) {
            return Err(SessionError::InvalidState { state: self.state });
        }
        if image.is_empty() {
            return Err(DecodeError::EmptyInput.into());
        }
        self.accept_source(image);
        Ok(())
    }

    fn accept_source(&mut self, image: SourceImage) {
        self.source = Some(image);
        self.pan_x = 0.0;
        self.pan_y = 0.0;
        self.zoom = self.config.min_zoom;
        self.rotation_degrees = 0.0;
        self.last_region = None;
        self.state = SessionState::Editing;
    }

    /// Set the zoom factor, clamped to the configured bounds. No-op outside
    /// Editing.
    pub fn set_zoom(&mut self, zoom: f64) {
        if self.state != SessionState::Editing {
            return;
        }
        self.zoom = clamp_zoom(zoom, self.config.min_zoom, self.config.max_zoom);
    }

    /// Set the rotation, normalized to [0, 360). No-op outside Editing.
    pub fn set_rotation(&mut self, degrees: f64) {
        if self.state != SessionState::Editing {
            return;
        }
        self.rotation_degrees = normalize_rotation(degrees);
    }

    /// Rotate by a delta (e.g. the +/-90 buttons), wrapping mod 360.
    pub fn rotate_by(&mut self, delta_degrees: f64) {
        if self.state != SessionState::Editing {
            return;
        }
        self.rotation_degrees = normalize_rotation(self.rotation_degrees + delta_degrees);
    }

    /// Set the pan offset of the image relative to the viewport center, in
    /// display pixels. No-op outside Editing.
    pub fn set_pan(&mut self, x: f64, y: f64) {
        if self.state != SessionState::Editing {
            return;
        }
        self.pan_x = x;
        self.pan_y = y;
    }

    /// Resolve the current pan/zoom/rotation into a source-pixel crop
    /// region for the given viewport.
    ///
    /// The aspect constraint is applied here, by shrinking the viewport to
    /// the configured ratio; the pipeline downstream only ever sees the
    /// already-constrained rectangle.
    pub fn region(&mut self, viewport: &Viewport) -> Result<CropRegion, SessionError> {
        let region = self.resolve_region(viewport)?;
        self.last_region = Some(region);
        Ok(region)
    }

    fn resolve_region(&self, viewport: &Viewport) -> Result<CropRegion, SessionError> {
        let source = self.source.as_ref().ok_or(SessionError::NoSource)?;
        let vp = self.effective_viewport(viewport);

        let src_w = source.width as f64;
        let src_h = source.height as f64;

        // "Cover" fit: the image always fills the crop window, so with the
        // zoom floor at 1 the window can never outgrow the image. Display
        // pixels per source pixel:
        let base = (vp.width / src_w).max(vp.height / src_h);
        if !(base.is_finite() && base > 0.0) {
            return Ok(CropRegion::new(0.0, 0.0, 0.0, 0.0)
                .with_rotation(self.rotation_degrees));
        }
        let scale = base * self.zoom;

        // The mins only absorb floating-point dust; cover fit plus the zoom
        // floor already keep the window inside the image.
        let region_w = (vp.width / scale).min(src_w);
        let region_h = (vp.height / scale).min(src_h);

        // Pan moves the image under the window; the window therefore moves
        // the opposite way in source space.
        let center_x = src_w / 2.0 - self.pan_x / scale;
        let center_y = src_h / 2.0 - self.pan_y / scale;

        let x = (center_x - region_w / 2.0).clamp(0.0, src_w - region_w);
        let y = (center_y - region_h / 2.0).clamp(0.0, src_h - region_h);

        Ok(CropRegion::new(x, y, region_w, region_h).with_rotation(self.rotation_degrees))
    }

    /// Largest sub-rectangle of the viewport matching the configured aspect.
    fn effective_viewport(&self, viewport: &Viewport) -> Viewport {
        match self.config.aspect {
            None => *viewport,
            Some(aspect) => {
                if viewport.height <= 0.0 || viewport.width / viewport.height > aspect {
                    Viewport::new(viewport.height * aspect, viewport.height)
                } else {
                    Viewport::new(viewport.width, viewport.width / aspect)
                }
            }
        }
    }

    /// Resolve the region and run the pipeline.
    ///
    /// On success the session is Consumed and the artifact belongs to the
    /// caller. On failure the session returns to Editing with the source
    /// still loaded.
    pub fn save(&mut self, viewport: &Viewport) -> Result<CroppedArtifact, SessionError> {
        if self.state != SessionState::Editing {
            return Err(SessionError::InvalidState { state: self.state });
        }

        let region = match self.resolve_region(viewport) {
            Ok(region) => region,
            Err(e) => return Err(e),
        };
        self.last_region = Some(region);
        self.state = SessionState::Saving;

        let source = match self.source.as_ref() {
            Some(source) => source,
            None => {
                self.state = SessionState::Editing;
                return Err(SessionError::NoSource);
            }
        };

        match compute_cropped_image_with_quality(source, &region, self.config.jpeg_quality) {
            Ok(artifact) => {
                self.state = SessionState::Consumed;
                self.source = None;
                Ok(artifact)
            }
            Err(e) => {
                self.state = SessionState::Editing;
                Err(e.into())
            }
        }
    }

    /// Abort the session. Drops the source; no artifact is produced.
    ///
    /// No-op in terminal states.
    pub fn cancel(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.source = None;
        self.last_region = None;
        self.state = SessionState::Cancelled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_source(width: u32, height: u32) -> SourceImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.extend_from_slice(&[v, v, v]);
            }
        }
        SourceImage::new(width, height, pixels)
    }

    fn editing_session(config: CropConfig, width: u32, height: u32) -> CropSession {
        let mut session = CropSession::new(config);
        session.load_source(test_source(width, height)).unwrap();
        session
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = CropSession::new(CropConfig::avatar());
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.source().is_none());
        assert_eq!(session.zoom(), 1.0);
    }

    #[test]
    fn test_presets() {
        let avatar = CropConfig::avatar();
        assert_eq!(avatar.aspect, Some(1.0));
        assert_eq!(avatar.max_zoom, 2.0);

        let portrait = CropConfig::portrait();
        assert_eq!(portrait.aspect, Some(0.8));

        let document = CropConfig::document();
        assert_eq!(document.aspect, None);
        assert_eq!(document.max_zoom, 3.0);
    }

    #[test]
    fn test_config_zoom_bounds_repaired() {
        let config = CropConfig {
            min_zoom: 2.0,
            max_zoom: 1.0,
            ..CropConfig::avatar()
        };
        let session = CropSession::new(config);
        assert_eq!(session.config().max_zoom, 2.0);
    }

    #[test]
    fn test_load_enters_editing_with_reset_controls() {
        let mut session = CropSession::new(CropConfig::avatar());
        session.load_source(test_source(100, 100)).unwrap();

        assert_eq!(session.state(), SessionState::Editing);
        assert_eq!(session.zoom(), 1.0);
        assert_eq!(session.rotation_degrees(), 0.0);
        assert_eq!(session.pan(), (0.0, 0.0));
    }

    #[test]
    fn test_load_bad_bytes_keeps_state() {
        let mut session = CropSession::new(CropConfig::avatar());
        let result = session.load_source_bytes(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(matches!(result, Err(SessionError::Decode(_))));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_load_bad_bytes_keeps_previous_source() {
        let mut session = editing_session(CropConfig::avatar(), 100, 100);
        let result = session.load_source_bytes(&[0x00, 0x01]);
        assert!(result.is_err());
        // Still editing the previous image
        assert_eq!(session.state(), SessionState::Editing);
        assert!(session.source().is_some());
    }

    #[test]
    fn test_zoom_clamped_on_every_update() {
        let mut session = editing_session(CropConfig::avatar(), 100, 100);

        session.set_zoom(0.1);
        assert_eq!(session.zoom(), 1.0);

        session.set_zoom(10.0);
        assert_eq!(session.zoom(), 2.0);

        session.set_zoom(1.5);
        assert_eq!(session.zoom(), 1.5);
    }

    #[test]
    fn test_zoom_ignored_outside_editing() {
        let mut session = CropSession::new(CropConfig::avatar());
        session.set_zoom(1.8);
        assert_eq!(session.zoom(), 1.0);
    }

    #[test]
    fn test_rotation_normalized() {
        let mut session = editing_session(CropConfig::avatar(), 100, 100);

        session.set_rotation(-90.0);
        assert_eq!(session.rotation_degrees(), 270.0);

        session.set_rotation(450.0);
        assert_eq!(session.rotation_degrees(), 90.0);
    }

    #[test]
    fn test_rotate_by_wraps() {
        let mut session = editing_session(CropConfig::avatar(), 100, 100);

        session.rotate_by(-90.0);
        assert_eq!(session.rotation_degrees(), 270.0);

        for _ in 0..4 {
            session.rotate_by(90.0);
        }
        assert_eq!(session.rotation_degrees(), 270.0);
    }

    #[test]
    fn test_region_full_image_at_min_zoom() {
        let mut session = editing_session(CropConfig::avatar(), 100, 100);
        let region = session.region(&Viewport::new(200.0, 200.0)).unwrap();

        assert_eq!(region.x, 0.0);
        assert_eq!(region.y, 0.0);
        assert_eq!(region.width, 100.0);
        assert_eq!(region.height, 100.0);
    }

    #[test]
    fn test_region_zoom_centers_window() {
        let mut session = editing_session(CropConfig::avatar(), 100, 100);
        session.set_zoom(2.0);
        let region = session.region(&Viewport::new(200.0, 200.0)).unwrap();

        assert_eq!(region.width, 50.0);
        assert_eq!(region.height, 50.0);
        assert_eq!(region.x, 25.0);
        assert_eq!(region.y, 25.0);
    }

    #[test]
    fn test_region_pan_shifts_window() {
        let mut session = editing_session(CropConfig::avatar(), 100, 100);
        session.set_zoom(2.0);
        // Dragging the image right moves the window left in source space
        session.set_pan(50.0, 0.0);
        let region = session.region(&Viewport::new(200.0, 200.0)).unwrap();

        // scale = 2 (cover) * 2 (zoom); 50 display px = 12.5 source px
        assert_eq!(region.x, 12.5);
        assert_eq!(region.y, 25.0);
    }

    #[test]
    fn test_region_pan_clamped_to_bounds() {
        let mut session = editing_session(CropConfig::avatar(), 100, 100);
        session.set_zoom(2.0);
        session.set_pan(100_000.0, -100_000.0);
        let region = session.region(&Viewport::new(200.0, 200.0)).unwrap();

        assert_eq!(region.x, 0.0);
        assert_eq!(region.y, 50.0);
    }

    #[test]
    fn test_region_resolution_independent() {
        let mut small = editing_session(CropConfig::avatar(), 120, 80);
        let mut large = editing_session(CropConfig::avatar(), 120, 80);
        small.set_zoom(1.5);
        large.set_zoom(1.5);

        let a = small.region(&Viewport::new(200.0, 200.0)).unwrap();
        let b = large.region(&Viewport::new(400.0, 400.0)).unwrap();

        assert!((a.x - b.x).abs() < 1e-9);
        assert!((a.y - b.y).abs() < 1e-9);
        assert!((a.width - b.width).abs() < 1e-9);
        assert!((a.height - b.height).abs() < 1e-9);
    }

    #[test]
    fn test_region_respects_aspect() {
        let mut session = editing_session(CropConfig::portrait(), 200, 200);
        let region = session.region(&Viewport::new(300.0, 300.0)).unwrap();

        assert!((region.width / region.height - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_region_free_aspect_follows_viewport() {
        let mut session = editing_session(CropConfig::document(), 200, 100);
        let region = session.region(&Viewport::new(300.0, 150.0)).unwrap();

        // Free aspect: the window keeps the viewport's 2:1 ratio
        assert!((region.width / region.height - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_region_carries_rotation() {
        let mut session = editing_session(CropConfig::avatar(), 100, 100);
        session.set_rotation(37.5);
        let region = session.region(&Viewport::new(200.0, 200.0)).unwrap();
        assert_eq!(region.rotation_degrees, 37.5);
    }

    #[test]
    fn test_save_consumes_session() {
        let mut session = editing_session(CropConfig::avatar(), 100, 100);
        session.set_zoom(2.0);

        let artifact = session.save(&Viewport::new(200.0, 200.0)).unwrap();
        assert_eq!(artifact.width, 50);
        assert_eq!(artifact.height, 50);
        assert_eq!(artifact.mime, "image/jpeg");
        assert_eq!(&artifact.bytes[0..2], &[0xFF, 0xD8]);

        assert_eq!(session.state(), SessionState::Consumed);
        assert!(session.source().is_none());

        // Only one save per session
        let again = session.save(&Viewport::new(200.0, 200.0));
        assert!(matches!(again, Err(SessionError::InvalidState { .. })));
    }

    #[test]
    fn test_save_failure_returns_to_editing() {
        let mut session = editing_session(CropConfig::avatar(), 100, 100);

        // Degenerate viewport resolves to an empty region; the pipeline
        // rejects it and the session must come back intact
        let result = session.save(&Viewport::new(0.0, 0.0));
        assert!(matches!(
            result,
            Err(SessionError::Crop(CropError::EmptyRegion { .. }))
        ));
        assert_eq!(session.state(), SessionState::Editing);
        assert!(session.source().is_some());

        // Retry with a sane viewport succeeds
        let artifact = session.save(&Viewport::new(200.0, 200.0)).unwrap();
        assert_eq!(artifact.width, 100);
    }

    #[test]
    fn test_encode_failure_surfaces_as_crop_error() {
        // The save failure arm is variant-agnostic; an encoder failure takes
        // the same return-to-Editing path as an empty region, wrapped through
        // the error conversions checked here.
        let err = SessionError::from(CropError::from(
            crate::encode::EncodeError::EncodingFailed("empty output".to_string()),
        ));
        assert!(matches!(err, SessionError::Crop(CropError::Encode(_))));
    }

    #[test]
    fn test_save_requires_editing() {
        let mut session = CropSession::new(CropConfig::avatar());
        let result = session.save(&Viewport::new(200.0, 200.0));
        assert!(matches!(
            result,
            Err(SessionError::InvalidState {
                state: SessionState::Idle
            })
        ));
    }

    #[test]
    fn test_cancel_produces_nothing() {
        let mut session = editing_session(CropConfig::avatar(), 100, 100);
        session.cancel();

        assert_eq!(session.state(), SessionState::Cancelled);
        assert!(session.source().is_none());
        assert!(session.last_region().is_none());

        // Terminal: no further loads or saves
        assert!(session.load_source(test_source(10, 10)).is_err());
        assert!(matches!(
            session.save(&Viewport::new(200.0, 200.0)),
            Err(SessionError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_cancel_is_idempotent_after_consume() {
        let mut session = editing_session(CropConfig::avatar(), 50, 50);
        session.save(&Viewport::new(100.0, 100.0)).unwrap();

        session.cancel();
        // Consumed is terminal; cancel does not rewrite history
        assert_eq!(session.state(), SessionState::Consumed);
    }

    #[test]
    fn test_saved_artifact_matches_pipeline_output() {
        let source = test_source(100, 100);
        let mut session = CropSession::new(CropConfig::avatar());
        session.load_source(source.clone()).unwrap();
        session.set_zoom(2.0);

        let region = session.region(&Viewport::new(200.0, 200.0)).unwrap();
        let direct =
            compute_cropped_image_with_quality(&source, &region, DEFAULT_JPEG_QUALITY).unwrap();
        let saved = session.save(&Viewport::new(200.0, 200.0)).unwrap();

        assert_eq!(saved.bytes, direct.bytes);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
