//! Artifact encoding.
//!
//! The crop pipeline emits JPEG regardless of the input format, matching the
//! upload contract of the profile/document flows that consume it.

mod jpeg;

pub use jpeg::{encode_jpeg, EncodeError, DEFAULT_JPEG_QUALITY};
