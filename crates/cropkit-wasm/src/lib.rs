//! Cropkit WASM - WebAssembly bindings for the cropkit crop pipeline
//!
//! This crate exposes the cropkit-core functionality to JavaScript and
//! TypeScript applications, replacing the `<canvas>`-based crop utilities
//! the upload flows previously hand-rolled per call site.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - image decoding bindings (JPEG/PNG/WebP, EXIF orientation)
//! - `pipeline` - stateless crop + encode bindings
//! - `session` - the interactive crop session object
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsCropSession } from '@cropkit/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const session = new JsCropSession('avatar');
//! session.load(new Uint8Array(await file.arrayBuffer()));
//! const jpeg = session.save(320, 320);
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod pipeline;
mod session;
mod types;

// Re-export public types
pub use decode::{decode_image, decode_image_no_orientation};
pub use pipeline::{compute_cropped_image, render_crop_preview};
pub use session::JsCropSession;
pub use types::JsSourceImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    // Future: Set up panic hook for better error messages in browser console
    // when console_error_panic_hook feature is added
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
