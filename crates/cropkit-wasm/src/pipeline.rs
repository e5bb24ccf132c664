//! WASM bindings for the crop pipeline.
//!
//! These are the stateless entry points: callers that run their own crop UI
//! (or already know the region) can invoke the pipeline directly without a
//! session object.

use crate::types::JsSourceImage;
use cropkit_core::pipeline::{
    compute_cropped_image_with_quality, render_cropped_pixels, CropRegion,
};
use cropkit_core::encode::DEFAULT_JPEG_QUALITY;
use wasm_bindgen::prelude::*;

/// Crop a region out of the source and encode it as a JPEG.
///
/// The region is given in source-image pixel coordinates; rotation is in
/// degrees and may be negative (normalized mod 360).
///
/// # Returns
///
/// JPEG bytes as a `Uint8Array`, or an error string if the region is empty
/// or encoding fails. An error means "crop failed, do not upload".
///
/// # Example (TypeScript)
///
/// ```typescript
/// const jpeg = compute_cropped_image(image, 10, 10, 320, 400, 90);
/// await upload(new Blob([jpeg], { type: 'image/jpeg' }));
/// ```
#[wasm_bindgen]
pub fn compute_cropped_image(
    image: &JsSourceImage,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rotation_degrees: f64,
) -> Result<Vec<u8>, JsValue> {
    let source = image.to_source();
    let region = CropRegion::new(x, y, width, height).with_rotation(rotation_degrees);

    compute_cropped_image_with_quality(&source, &region, DEFAULT_JPEG_QUALITY)
        .map(|artifact| artifact.bytes)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Render the cropped pixels without encoding, for live previews.
///
/// Returns a `JsSourceImage` whose dimensions equal the rounded region
/// dimensions.
#[wasm_bindgen]
pub fn render_crop_preview(
    image: &JsSourceImage,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rotation_degrees: f64,
) -> Result<JsSourceImage, JsValue> {
    let source = image.to_source();
    let region = CropRegion::new(x, y, width, height).with_rotation(rotation_degrees);

    render_cropped_pixels(&source, &region)
        .map(JsSourceImage::from_source)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
