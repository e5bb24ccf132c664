//! Crop geometry: regions, rotation normalization, working-canvas math.
//!
//! # Coordinate System
//!
//! - Crop regions are expressed in source-image pixel coordinates
//! - Origin is the top-left corner, y grows downward
//! - Rotation angles are in degrees, positive = clockwise on screen,
//!   normalized to [0, 360)
//!
//! # Working Canvas
//!
//! Rotated crops are resolved against a conceptual square canvas of side
//! `2 * max(source_width, source_height)` with the source drawn centered.
//! That side length guarantees no corner of the source leaves the canvas at
//! any rotation angle, so extraction coordinates can always be clamped into
//! range instead of failing.

use serde::{Deserialize, Serialize};

/// Angles closer than this to a multiple of 360 are treated as no rotation.
pub(crate) const ANGLE_EPSILON: f64 = 1e-3;

/// A rectangular crop selection in source-image pixel coordinates.
///
/// The rectangle is what the interactive session resolved from pan/zoom; the
/// rotation rides along because extraction happens against the rotated
/// working canvas. Aspect-ratio constraints are applied where the region is
/// produced, never here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    /// Left edge, in source pixels.
    pub x: f64,
    /// Top edge, in source pixels.
    pub y: f64,
    /// Width, in source pixels.
    pub width: f64,
    /// Height, in source pixels.
    pub height: f64,
    /// Rotation in degrees, normalized to [0, 360).
    pub rotation_degrees: f64,
}

impl CropRegion {
    /// Create an axis-aligned region with no rotation.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation_degrees: 0.0,
        }
    }

    /// Attach a rotation, normalizing it to [0, 360).
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation_degrees = normalize_rotation(degrees);
        self
    }

    /// Output dimensions in whole pixels.
    ///
    /// Fractional regions round to the nearest pixel; a region that rounds
    /// to zero in either dimension is empty.
    pub fn pixel_dimensions(&self) -> (u32, u32) {
        let w = self.width.round().max(0.0) as u32;
        let h = self.height.round().max(0.0) as u32;
        (w, h)
    }

    /// True when the rotation is effectively zero (mod 360).
    pub fn is_axis_aligned(&self) -> bool {
        let r = normalize_rotation(self.rotation_degrees);
        r < ANGLE_EPSILON || (360.0 - r) < ANGLE_EPSILON
    }
}

/// Normalize a rotation angle to the range [0, 360).
///
/// Negative angles wrap: -90 becomes 270. Non-finite input maps to 0.
pub fn normalize_rotation(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let r = degrees % 360.0;
    if r < 0.0 {
        r + 360.0
    } else {
        r
    }
}

/// Clamp a zoom factor to the configured bounds.
///
/// Never fails: non-finite input snaps to `min`.
pub fn clamp_zoom(zoom: f64, min: f64, max: f64) -> f64 {
    if !zoom.is_finite() {
        return min;
    }
    zoom.clamp(min, max)
}

/// Side length of the square working canvas for a rotated crop.
///
/// `2 * max(width, height)` always covers the source's diagonal
/// (`sqrt(w^2 + h^2) <= 2 * max(w, h)`), so no rotation can clip a corner.
pub fn working_canvas_side(width: u32, height: u32) -> u32 {
    2 * width.max(height).max(1)
}

/// Offset that centers an extent of the given size on the working canvas.
pub fn centering_offset(side: u32, extent: u32) -> f64 {
    (side as f64 - extent as f64) / 2.0
}

/// Clamp an extraction origin so `[origin, origin + extent]` stays inside
/// `[0, side]`.
///
/// Guards against floating-point drift in the session's region math; the
/// pipeline must never read outside the working canvas.
pub fn clamp_extraction_origin(origin: f64, extent: f64, side: u32) -> f64 {
    let max_origin = (side as f64 - extent).max(0.0);
    origin.clamp(0.0, max_origin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_identity() {
        assert_eq!(normalize_rotation(0.0), 0.0);
        assert_eq!(normalize_rotation(37.5), 37.5);
        assert_eq!(normalize_rotation(359.9), 359.9);
    }

    #[test]
    fn test_normalize_full_turns() {
        assert_eq!(normalize_rotation(360.0), 0.0);
        assert_eq!(normalize_rotation(720.0), 0.0);
        assert_eq!(normalize_rotation(450.0), 90.0);
    }

    #[test]
    fn test_normalize_negative() {
        assert_eq!(normalize_rotation(-90.0), 270.0);
        assert_eq!(normalize_rotation(-360.0), 0.0);
        assert_eq!(normalize_rotation(-450.0), 270.0);
    }

    #[test]
    fn test_normalize_non_finite() {
        assert_eq!(normalize_rotation(f64::NAN), 0.0);
        assert_eq!(normalize_rotation(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_clamp_zoom() {
        assert_eq!(clamp_zoom(1.5, 1.0, 3.0), 1.5);
        assert_eq!(clamp_zoom(0.2, 1.0, 3.0), 1.0);
        assert_eq!(clamp_zoom(9.0, 1.0, 3.0), 3.0);
        assert_eq!(clamp_zoom(f64::NAN, 1.0, 3.0), 1.0);
    }

    #[test]
    fn test_working_canvas_side() {
        assert_eq!(working_canvas_side(100, 50), 200);
        assert_eq!(working_canvas_side(50, 100), 200);
        assert_eq!(working_canvas_side(1, 1), 2);
        // Degenerate zero dimension still yields a usable canvas
        assert_eq!(working_canvas_side(0, 0), 2);
    }

    #[test]
    fn test_working_canvas_covers_diagonal() {
        for &(w, h) in &[(100u32, 100u32), (200, 50), (7, 3), (1, 1)] {
            let side = working_canvas_side(w, h) as f64;
            let diagonal = ((w as f64).powi(2) + (h as f64).powi(2)).sqrt();
            assert!(side >= diagonal, "{}x{}: side {} < diagonal {}", w, h, side, diagonal);
        }
    }

    #[test]
    fn test_centering_offset() {
        assert_eq!(centering_offset(200, 100), 50.0);
        assert_eq!(centering_offset(200, 50), 75.0);
        assert_eq!(centering_offset(2, 1), 0.5);
    }

    #[test]
    fn test_clamp_extraction_origin() {
        assert_eq!(clamp_extraction_origin(10.0, 50.0, 200), 10.0);
        assert_eq!(clamp_extraction_origin(-3.0, 50.0, 200), 0.0);
        assert_eq!(clamp_extraction_origin(180.0, 50.0, 200), 150.0);
        // Extent larger than the canvas pins the origin to zero
        assert_eq!(clamp_extraction_origin(10.0, 500.0, 200), 0.0);
    }

    #[test]
    fn test_region_pixel_dimensions() {
        let region = CropRegion::new(10.0, 10.0, 50.4, 49.6);
        assert_eq!(region.pixel_dimensions(), (50, 50));

        let empty = CropRegion::new(0.0, 0.0, 0.2, 10.0);
        assert_eq!(empty.pixel_dimensions().0, 0);
    }

    #[test]
    fn test_region_axis_aligned() {
        assert!(CropRegion::new(0.0, 0.0, 10.0, 10.0).is_axis_aligned());
        assert!(CropRegion::new(0.0, 0.0, 10.0, 10.0)
            .with_rotation(360.0)
            .is_axis_aligned());
        assert!(CropRegion::new(0.0, 0.0, 10.0, 10.0)
            .with_rotation(-720.0)
            .is_axis_aligned());
        assert!(!CropRegion::new(0.0, 0.0, 10.0, 10.0)
            .with_rotation(90.0)
            .is_axis_aligned());
        assert!(!CropRegion::new(0.0, 0.0, 10.0, 10.0)
            .with_rotation(37.5)
            .is_axis_aligned());
    }

    #[test]
    fn test_with_rotation_normalizes() {
        let region = CropRegion::new(0.0, 0.0, 10.0, 10.0).with_rotation(-90.0);
        assert_eq!(region.rotation_degrees, 270.0);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
