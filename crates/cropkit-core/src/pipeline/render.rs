//! Crop rendering: region extraction, rotation resampling, artifact encode.
//!
//! # Algorithm
//!
//! For an axis-aligned region the crop is a direct row copy from the source,
//! pixel-exact with no resampling.
//!
//! For a rotated region the crop is resolved against the square working
//! canvas (see [`geometry`](super::geometry)): the source is conceptually
//! drawn centered, rotated about the canvas center, and the region is read
//! back at its canvas position. Rather than rasterizing the full canvas,
//! each output pixel is inverse-mapped:
//!
//! ```text
//! canvas = (region.x + offset_x + ox, region.y + offset_y + oy)
//! source = R(-theta) * (canvas - center) + center - offset
//! ```
//!
//! and sampled from the source with bilinear interpolation. Canvas area not
//! covered by the source reads as black.

use thiserror::Error;

use super::geometry::{
    centering_offset, clamp_extraction_origin, working_canvas_side, CropRegion,
};
use crate::decode::{DecodeError, SourceImage};
use crate::encode::{encode_jpeg, EncodeError, DEFAULT_JPEG_QUALITY};

/// Errors produced by the crop pipeline.
#[derive(Debug, Error)]
pub enum CropError {
    /// The region rounds to zero pixels in at least one dimension.
    #[error("Crop region is empty: {width}x{height}")]
    EmptyRegion { width: f64, height: f64 },

    /// The source image failed to load.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The output image could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// The final encoded image produced by a successful crop.
///
/// Ownership transfers to the caller; choosing a storage key and performing
/// the upload are its concern, not the pipeline's.
#[derive(Debug, Clone)]
pub struct CroppedArtifact {
    /// Output width in pixels, exactly the rounded region width.
    pub width: u32,
    /// Output height in pixels, exactly the rounded region height.
    pub height: u32,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub mime: &'static str,
}

/// Crop a region out of the source, honoring the region's rotation, and
/// encode the result as a JPEG at default quality.
///
/// Output dimensions are exactly the region's rounded pixel dimensions. At
/// rotation 0 the crop is pixel-exact; otherwise pixels are bilinearly
/// resampled through the rotated working canvas.
///
/// # Errors
///
/// `CropError::EmptyRegion` if the region rounds below 1x1,
/// `CropError::Decode` for an unusable source, and `CropError::Encode` if
/// JPEG encoding yields nothing. No partial artifact is ever returned.
pub fn compute_cropped_image(
    source: &SourceImage,
    region: &CropRegion,
) -> Result<CroppedArtifact, CropError> {
    compute_cropped_image_with_quality(source, region, DEFAULT_JPEG_QUALITY)
}

/// Same as [`compute_cropped_image`] with an explicit JPEG quality.
pub fn compute_cropped_image_with_quality(
    source: &SourceImage,
    region: &CropRegion,
    quality: u8,
) -> Result<CroppedArtifact, CropError> {
    let rendered = render_cropped_pixels(source, region)?;
    let bytes = encode_jpeg(&rendered.pixels, rendered.width, rendered.height, quality)?;

    Ok(CroppedArtifact {
        width: rendered.width,
        height: rendered.height,
        bytes,
        mime: "image/jpeg",
    })
}

/// Raster stage of the pipeline: produces the cropped RGB pixels without
/// encoding them.
///
/// Exposed so previews can be rendered without paying for a JPEG encode on
/// every adjustment.
pub fn render_cropped_pixels(
    source: &SourceImage,
    region: &CropRegion,
) -> Result<SourceImage, CropError> {
    if source.is_empty() {
        return Err(DecodeError::EmptyInput.into());
    }

    let (out_w, out_h) = region.pixel_dimensions();
    if out_w == 0 || out_h == 0 {
        return Err(CropError::EmptyRegion {
            width: region.width,
            height: region.height,
        });
    }

    // No region can exceed the working canvas; capping here keeps buffer
    // sizes bounded by the source dimensions even for absurd input.
    let side = working_canvas_side(source.width, source.height);
    let out_w = out_w.min(side);
    let out_h = out_h.min(side);

    let pixels = if region.is_axis_aligned() {
        crop_axis_aligned(source, region, out_w, out_h)
    } else {
        crop_rotated(source, region, out_w, out_h)
    };

    Ok(SourceImage::new(out_w, out_h, pixels))
}

/// Pixel-exact crop for rotation 0. Rows are copied directly; any requested
/// area outside the source stays black.
fn crop_axis_aligned(
    source: &SourceImage,
    region: &CropRegion,
    out_w: u32,
    out_h: u32,
) -> Vec<u8> {
    let src_w = source.width;
    let src_h = source.height;

    let x0 = (region.x.round() as i64).clamp(0, src_w.saturating_sub(out_w) as i64) as u32;
    let y0 = (region.y.round() as i64).clamp(0, src_h.saturating_sub(out_h) as i64) as u32;

    let copy_w = out_w.min(src_w.saturating_sub(x0));
    let copy_h = out_h.min(src_h.saturating_sub(y0));

    let mut output = vec![0u8; (out_w * out_h * 3) as usize];

    for y in 0..copy_h {
        let src_start = (((y0 + y) * src_w + x0) * 3) as usize;
        let dst_start = (y * out_w * 3) as usize;
        let len = (copy_w * 3) as usize;
        output[dst_start..dst_start + len]
            .copy_from_slice(&source.pixels[src_start..src_start + len]);
    }

    output
}

/// Resampling crop for nonzero rotation, via inverse mapping through the
/// working canvas.
fn crop_rotated(source: &SourceImage, region: &CropRegion, out_w: u32, out_h: u32) -> Vec<u8> {
    let side = working_canvas_side(source.width, source.height);
    let off_x = centering_offset(side, source.width);
    let off_y = centering_offset(side, source.height);
    let center = side as f64 / 2.0;

    // Clamped before any read: floating-point drift in the session's region
    // math must not push the window off the canvas.
    let ex = clamp_extraction_origin(region.x + off_x, out_w as f64, side);
    let ey = clamp_extraction_origin(region.y + off_y, out_h as f64, side);

    // The canvas rotates the drawn source by +theta, so canvas points map
    // back to source points through -theta.
    let theta = region.rotation_degrees.to_radians();
    let (sin, cos) = (-theta).sin_cos();

    let mut output = vec![0u8; (out_w * out_h * 3) as usize];

    for oy in 0..out_h {
        for ox in 0..out_w {
            // Pixel-center coordinates keep exact 90/180/270 turns lossless.
            let dx = ex + ox as f64 + 0.5 - center;
            let dy = ey + oy as f64 + 0.5 - center;

            let sx = dx * cos - dy * sin + center - off_x;
            let sy = dx * sin + dy * cos + center - off_y;

            let pixel = sample_bilinear(source, sx - 0.5, sy - 0.5);

            let dst_idx = ((oy * out_w + ox) * 3) as usize;
            output[dst_idx] = pixel[0];
            output[dst_idx + 1] = pixel[1];
            output[dst_idx + 2] = pixel[2];
        }
    }

    output
}

#[inline]
fn snap_to_integer(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < 1e-9 {
        r
    } else {
        v
    }
}

/// Get a pixel as [f64; 3] from an image at the given coordinates.
#[inline]
fn get_pixel_f64(image: &SourceImage, px: usize, py: usize) -> [f64; 3] {
    let idx = (py * image.width as usize + px) * 3;
    [
        image.pixels[idx] as f64,
        image.pixels[idx + 1] as f64,
        image.pixels[idx + 2] as f64,
    ]
}

/// Sample a pixel using bilinear interpolation.
///
/// Coordinates outside the source return black, matching what reading an
/// undrawn canvas region yields. Neighbor indices are clamped so integer
/// positions on the last row/column still sample exactly.
fn sample_bilinear(image: &SourceImage, x: f64, y: f64) -> [u8; 3] {
    let (w, h) = (image.width as usize, image.height as usize);

    // Exact quarter turns leave cos(theta) at ~1e-16 instead of zero, which
    // puts sample coordinates an ulp away from integers. Snap them so those
    // rotations stay lossless.
    let x = snap_to_integer(x);
    let y = snap_to_integer(y);

    if x < 0.0 || y < 0.0 || x > (w - 1) as f64 || y > (h - 1) as f64 {
        return [0, 0, 0];
    }

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);

    // Fractional distances
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_pixel_f64(image, x0, y0);
    let p10 = get_pixel_f64(image, x1, y0);
    let p01 = get_pixel_f64(image, x0, y1);
    let p11 = get_pixel_f64(image, x1, y1);

    let mut result = [0u8; 3];
    for i in 0..3 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    result
}


// ============================================================================
// Property-Based Tests
// ============================================================================
