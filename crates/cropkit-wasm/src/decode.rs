//! Image decoding WASM bindings.
//!
//! The browser flow reads the selected file into a `Uint8Array` and hands
//! the bytes here; decoding and EXIF orientation correction happen in WASM
//! so the session math always works on oriented pixels.

use crate::types::JsSourceImage;
use cropkit_core::decode;
use wasm_bindgen::prelude::*;

/// Decode image bytes (JPEG, PNG, or WebP) with EXIF orientation applied.
///
/// # Arguments
///
/// * `bytes` - Raw image file bytes as a `Uint8Array`
///
/// # Returns
///
/// A `JsSourceImage`, or an error string if the bytes are empty, corrupt,
/// unsupported, or oversized.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const bytes = new Uint8Array(await file.arrayBuffer());
/// const image = decode_image(bytes);
/// console.log(`Decoded ${image.width}x${image.height}`);
/// ```
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsSourceImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsSourceImage::from_source)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Decode image bytes without applying EXIF orientation.
#[wasm_bindgen]
pub fn decode_image_no_orientation(bytes: &[u8]) -> Result<JsSourceImage, JsValue> {
    decode::decode_image_no_orientation(bytes)
        .map(JsSourceImage::from_source)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
