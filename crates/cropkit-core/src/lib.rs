//! Cropkit Core - crop pipeline for profile photos and document scans
//!
//! This crate provides the image processing behind avatar and document
//! upload flows: decoding user-supplied images, resolving an interactive
//! pan/zoom/rotate selection into a pixel crop region, rendering that region
//! (with rotation resampling where needed), and encoding the result as a
//! JPEG artifact ready for upload.
//!
//! # Modules
//!
//! - [`decode`] - source image decoding (JPEG/PNG/WebP) with EXIF
//!   orientation correction
//! - [`pipeline`] - the crop pipeline: geometry, rendering, artifact encode
//! - [`session`] - the interactive crop session state machine
//! - [`encode`] - JPEG artifact encoding
//!
//! # Typical Flow
//!
//! ```ignore
//! use cropkit_core::session::{CropConfig, CropSession, Viewport};
//!
//! let mut session = CropSession::new(CropConfig::avatar());
//! session.load_source_bytes(&upload_bytes)?;
//! session.set_zoom(1.4);
//! session.rotate_by(90.0);
//! let artifact = session.save(&Viewport::new(320.0, 320.0))?;
//! // artifact.bytes is a JPEG; storage key and upload are the caller's job
//! ```

pub mod decode;
pub mod encode;
pub mod pipeline;
pub mod session;

pub use decode::{decode_image, DecodeError, SourceImage};
pub use encode::{encode_jpeg, EncodeError, DEFAULT_JPEG_QUALITY};
pub use pipeline::{compute_cropped_image, CropError, CropRegion, CroppedArtifact};
pub use session::{CropConfig, CropSession, SessionError, SessionState, Viewport};

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let rgb = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 64])
        });
        let mut bytes = Vec::new();
        rgb.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_full_flow_from_bytes_to_artifact() {
        let mut session = CropSession::new(CropConfig::avatar());
        session.load_source_bytes(&png_bytes(120, 90)).unwrap();
        session.set_zoom(1.5);
        session.rotate_by(-90.0);

        let artifact = session.save(&Viewport::new(300.0, 300.0)).unwrap();

        assert_eq!(artifact.mime, "image/jpeg");
        assert_eq!(&artifact.bytes[0..2], &[0xFF, 0xD8]);
        assert_eq!(session.state(), SessionState::Consumed);

        // The artifact decodes back to its recorded dimensions
        let decoded = decode::decode_image_no_orientation(&artifact.bytes).unwrap();
        assert_eq!(decoded.width, artifact.width);
        assert_eq!(decoded.height, artifact.height);
    }

    #[test]
    fn test_full_flow_cancel_leaves_no_artifact() {
        let mut session = CropSession::new(CropConfig::document());
        session.load_source_bytes(&png_bytes(64, 64)).unwrap();
        session.cancel();

        assert_eq!(session.state(), SessionState::Cancelled);
        assert!(session.save(&Viewport::new(100.0, 100.0)).is_err());
    }
}
