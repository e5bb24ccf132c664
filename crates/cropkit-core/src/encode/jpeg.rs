//! JPEG encoding for crop artifacts.
//!
//! The pipeline's output contract is a JPEG buffer at default encoder
//! quality, so this is the only encoder the crate ships. Quality remains
//! configurable for callers that want smaller document scans.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;
use thiserror::Error;

/// Quality used when the caller does not specify one.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Errors that can occur during JPEG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// JPEG encoding produced no usable output
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode RGB pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality (clamped to 1-100)
///
/// # Returns
///
/// JPEG-encoded bytes on success, or an error if encoding fails. Callers in
/// the upload flow treat any error as "crop failed, do not upload".
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    let quality = quality.clamp(1, 100);

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    encoder
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    reject_empty_output(buffer.into_inner())
}

/// An encoder that runs to completion but writes nothing is a failure; the
/// canvas contract this replaces yielded a null blob here, and callers must
/// not upload.
fn reject_empty_output(bytes: Vec<u8>) -> Result<Vec<u8>, EncodeError> {
    if bytes.is_empty() {
        return Err(EncodeError::EncodingFailed("empty output".to_string()));
    }
    Ok(bytes)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
