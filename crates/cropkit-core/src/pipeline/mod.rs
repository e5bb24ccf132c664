//! The crop pipeline: source image + crop region -> encoded artifact.
//!
//! This is the consolidation of what the product previously shipped as three
//! divergent canvas croppers (avatar upload, profile photo edit, document
//! scan). One code path handles all of them; aspect ratio and zoom bounds
//! live in the session configuration, not here.
//!
//! # Stages
//!
//! 1. Geometry: normalize rotation, size the working canvas, clamp the
//!    extraction window ([`geometry`])
//! 2. Raster: pixel-exact copy at rotation 0, inverse-mapped bilinear
//!    resampling otherwise ([`render_cropped_pixels`])
//! 3. Encode: JPEG at default quality ([`compute_cropped_image`])
//!
//! The pipeline performs no I/O and holds no state; it allocates one output
//! buffer per call and returns it.

mod geometry;
mod render;

pub use geometry::{
    centering_offset, clamp_extraction_origin, clamp_zoom, normalize_rotation,
    working_canvas_side, CropRegion,
};
pub use render::{
    compute_cropped_image, compute_cropped_image_with_quality, render_cropped_pixels, CropError,
    CroppedArtifact,
};
