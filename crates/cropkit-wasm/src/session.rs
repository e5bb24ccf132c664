//! WASM bindings for the interactive crop session.
//!
//! `JsCropSession` owns one `CropSession` across the lifetime of a crop
//! dialog. The UI forwards pan/zoom/rotation changes as they happen and
//! calls `save` or `cancel` when the dialog closes.

use cropkit_core::session::{CropConfig, CropSession, SessionState, Viewport};
use wasm_bindgen::prelude::*;

/// An interactive crop session for JavaScript callers.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const session = new JsCropSession('avatar');
/// session.load(new Uint8Array(await file.arrayBuffer()));
/// session.set_zoom(1.4);
/// session.rotate_by(90);
/// const jpeg = session.save(320, 320);   // Uint8Array, ready to upload
/// ```
#[wasm_bindgen]
pub struct JsCropSession {
    inner: CropSession,
}

#[wasm_bindgen]
impl JsCropSession {
    /// Create a session from a preset name: "avatar" (1:1, zoom 1-2),
    /// "portrait" (4:5, zoom 1-2), or "document" (free aspect, zoom 1-3).
    ///
    /// Unknown names fall back to "avatar".
    #[wasm_bindgen(constructor)]
    pub fn new(preset: &str) -> JsCropSession {
        let config = match preset {
            "portrait" => CropConfig::portrait(),
            "document" => CropConfig::document(),
            _ => CropConfig::avatar(),
        };
        JsCropSession {
            inner: CropSession::new(config),
        }
    }

    /// Decode image bytes and enter the editing state.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.inner
            .load_source_bytes(bytes)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Current state as a string: "idle", "editing", "saving", "consumed",
    /// or "cancelled".
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        match self.inner.state() {
            SessionState::Idle => "idle",
            SessionState::Editing => "editing",
            SessionState::Saving => "saving",
            SessionState::Consumed => "consumed",
            SessionState::Cancelled => "cancelled",
        }
        .to_string()
    }

    /// Current zoom factor (already clamped).
    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> f64 {
        self.inner.zoom()
    }

    /// Current rotation in degrees, normalized to [0, 360).
    #[wasm_bindgen(getter)]
    pub fn rotation(&self) -> f64 {
        self.inner.rotation_degrees()
    }

    /// Set the zoom factor; out-of-bounds values are clamped.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.inner.set_zoom(zoom);
    }

    /// Set the rotation in degrees; any value is normalized mod 360.
    pub fn set_rotation(&mut self, degrees: f64) {
        self.inner.set_rotation(degrees);
    }

    /// Rotate by a delta in degrees (e.g. -90 for the rotate-left button).
    pub fn rotate_by(&mut self, delta_degrees: f64) {
        self.inner.rotate_by(delta_degrees);
    }

    /// Set the pan offset in display pixels.
    pub fn set_pan(&mut self, x: f64, y: f64) {
        self.inner.set_pan(x, y);
    }

    /// Resolve the current crop region for a viewport, as a plain JS object
    /// `{ x, y, width, height, rotation_degrees }` in source pixels.
    pub fn region(&mut self, viewport_width: f64, viewport_height: f64) -> Result<JsValue, JsValue> {
        let region = self
            .inner
            .region(&Viewport::new(viewport_width, viewport_height))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        serde_wasm_bindgen::to_value(&region).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Crop, encode, and consume the session.
    ///
    /// Returns JPEG bytes on success. On failure the session returns to the
    /// editing state and the error is surfaced; the caller must not upload.
    pub fn save(&mut self, viewport_width: f64, viewport_height: f64) -> Result<Vec<u8>, JsValue> {
        match self
            .inner
            .save(&Viewport::new(viewport_width, viewport_height))
        {
            Ok(artifact) => Ok(artifact.bytes),
            Err(e) => {
                web_sys::console::warn_1(&JsValue::from_str(&format!("crop save failed: {}", e)));
                Err(JsValue::from_str(&e.to_string()))
            }
        }
    }

    /// Abort the session; no artifact is produced.
    pub fn cancel(&mut self) {
        self.inner.cancel();
    }
}
