//! Sketchlight WASM - WebAssembly bindings for the preview enhancer
//!
//! Exposes sketchlight-core to the browser so the light/contrast/vignette
//! preview runs client-side without a round trip.
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_sketch, fit_preview, enhance_image, EnhancementParams } from '@sketchlight/wasm';
//!
//! await init();
//!
//! const sketch = decode_sketch(new Uint8Array(await file.arrayBuffer()));
//! const preview = fit_preview(sketch, 800);
//! const enhanced = enhance_image(preview, new EnhancementParams());
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod encode;
mod enhance;
mod types;

pub use decode::{decode_sketch, fit_preview, preview_max_width};
pub use encode::encode_png;
pub use enhance::{enhance_image, EnhancementParams};
pub use types::JsRasterImage;

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
