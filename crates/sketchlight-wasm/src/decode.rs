//! Sketch decoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { decode_sketch, fit_preview, PREVIEW_MAX_WIDTH } from '@sketchlight/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const preview = fit_preview(decode_sketch(bytes), 800);
//! console.log(`Preview: ${preview.width}x${preview.height}`);
//! ```

use crate::types::JsRasterImage;
use sketchlight_core::decode::{self, DecodeError};
use wasm_bindgen::prelude::*;

/// Decode a PNG or JPEG sketch into RGBA pixels.
///
/// EXIF orientation is applied so the result matches what a browser draws.
///
/// # Errors
///
/// Returns an error if the format is unsupported or the file is corrupted.
#[wasm_bindgen]
pub fn decode_sketch(bytes: &[u8]) -> Result<JsRasterImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsRasterImage::from_raster)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn fit_raster(image: &JsRasterImage, max_width: u32) -> Result<JsRasterImage, DecodeError> {
    decode::fit_to_width(&image.to_raster(), max_width).map(JsRasterImage::from_raster)
}

/// Shrink an image to at most `max_width` pixels wide, keeping aspect ratio.
///
/// Narrower images come back unchanged; nothing is upscaled.
#[wasm_bindgen]
pub fn fit_preview(image: &JsRasterImage, max_width: u32) -> Result<JsRasterImage, JsValue> {
    fit_raster(image, max_width).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Default preview width used by the editor.
#[wasm_bindgen]
pub fn preview_max_width() -> u32 {
    decode::PREVIEW_MAX_WIDTH
}
