//! WASM-compatible wrapper types for image data.
//!
//! JavaScript callers get a thin wrapper around the core `SourceImage`,
//! with copies made at the boundary so WASM memory stays owned by Rust.

use cropkit_core::decode::SourceImage;
use wasm_bindgen::prelude::*;

/// A decoded source image wrapper for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy
/// is made to JavaScript memory as a `Uint8Array`. The `free()` method can
/// be called to explicitly release WASM memory, but this is optional as
/// wasm-bindgen's finalizer will handle cleanup automatically.
#[wasm_bindgen]
pub struct JsSourceImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsSourceImage {
    /// Create a new JsSourceImage from dimensions and RGB pixel data
    /// (3 bytes per pixel, row-major order).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsSourceImage {
        JsSourceImage {
            width,
            height,
            pixels,
        }
    }

    /// Get the image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the number of bytes in the pixel buffer (width * height * 3)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGB pixel data as Uint8Array.
    ///
    /// Note: This creates a copy of the pixel data.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Explicitly free WASM memory.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsSourceImage {
    /// Create a JsSourceImage from a core SourceImage.
    pub(crate) fn from_source(img: SourceImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }

    /// Convert back to a core SourceImage. Clones the pixel data.
    pub(crate) fn to_source(&self) -> SourceImage {
        SourceImage {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        }
    }
}
