//! Source image decoding with EXIF orientation handling.
//!
//! Accepts any format the `image` crate can identify from magic bytes; the
//! build enables JPEG, PNG, and WebP. Phone-camera uploads routinely arrive
//! with an EXIF orientation tag, so the default decode path corrects
//! orientation before the crop session ever sees the pixels.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::DynamicImage;
use image::ImageReader;

use super::{DecodeError, Orientation, SourceImage, MAX_SOURCE_EDGE};

/// Decode an image from bytes, applying EXIF orientation correction.
///
/// # Arguments
///
/// * `bytes` - Raw image file bytes (JPEG, PNG, or WebP)
///
/// # Returns
///
/// A `SourceImage` with RGB pixel data in display orientation.
///
/// # Errors
///
/// Returns `DecodeError::EmptyInput` for an empty slice,
/// `DecodeError::InvalidFormat` if the format cannot be identified,
/// `DecodeError::CorruptedFile` if decoding fails partway, and
/// `DecodeError::TooLarge` if either edge exceeds [`MAX_SOURCE_EDGE`].
pub fn decode_image(bytes: &[u8]) -> Result<SourceImage, DecodeError> {
    // Extract EXIF orientation before decoding; JPEG is the only format here
    // that carries it, and absence simply yields Normal.
    let orientation = extract_orientation(bytes);

    let img = decode_dynamic(bytes)?;
    let oriented_img = apply_orientation(img, orientation);

    let rgb_img = oriented_img.into_rgb8();
    Ok(SourceImage::from_rgb_image(rgb_img))
}

/// Decode an image from bytes without applying EXIF orientation.
///
/// Use this when the caller handles orientation itself or the bytes are
/// known to be pre-rotated.
pub fn decode_image_no_orientation(bytes: &[u8]) -> Result<SourceImage, DecodeError> {
    let img = decode_dynamic(bytes)?;
    let rgb_img = img.into_rgb8();
    Ok(SourceImage::from_rgb_image(rgb_img))
}

fn decode_dynamic(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    let cursor = Cursor::new(bytes);
    let reader = ImageReader::new(cursor)
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let (width, height) = (img.width(), img.height());
    if width > MAX_SOURCE_EDGE || height > MAX_SOURCE_EDGE {
        return Err(DecodeError::TooLarge {
            width,
            height,
            max_edge: MAX_SOURCE_EDGE,
        });
    }

    Ok(img)
}

/// Extract EXIF orientation from image bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let exif_reader = Reader::new();
    let mut cursor = Cursor::new(bytes);

    match exif_reader.read_from_container(&mut cursor) {
        Ok(exif) => {
            if let Some(field) = exif.get_field(Tag::Orientation, In::PRIMARY) {
                if let Some(value) = field.value.get_uint(0) {
                    return Orientation::from(value);
                }
            }
            Orientation::Normal
        }
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

/// Extract EXIF orientation value from image bytes (for external use).
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    extract_orientation(bytes)
}
