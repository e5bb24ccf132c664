//! Source image decoding for the crop pipeline.
//!
//! This module provides functionality for:
//! - Decoding user-supplied image bytes (JPEG, PNG, WebP)
//! - EXIF orientation correction so sessions work in display orientation
//! - Size guarding against pathological uploads
//!
//! # Architecture
//!
//! Decoding is the only step of a crop session that consumes untrusted
//! input, so all failure modes are surfaced as [`DecodeError`] values rather
//! than panics. All operations are synchronous over caller-supplied bytes;
//! fetching the bytes (file picker, network) is the caller's job.

mod reader;
mod types;

pub use reader::{decode_image, decode_image_no_orientation, get_orientation};
pub use types::{DecodeError, Orientation, SourceImage, MAX_SOURCE_EDGE};
