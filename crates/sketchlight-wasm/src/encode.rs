//! PNG export bindings for the enhanced preview.

use crate::types::JsRasterImage;
use sketchlight_core::encode;
use wasm_bindgen::prelude::*;

/// Encode an RGBA image to PNG bytes for download.
///
/// # Errors
///
/// Returns an error if the pixel buffer doesn't match the dimensions.
#[wasm_bindgen]
pub fn encode_png(image: &JsRasterImage) -> Result<Vec<u8>, JsValue> {
    encode::encode_png(&image.to_raster()).map_err(|e| JsValue::from_str(&e.to_string()))
}
