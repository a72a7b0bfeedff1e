//! Preview enhancement WASM bindings.
//!
//! The UI keeps one `EnhancementParams` bound to its three sliders and calls
//! [`enhance_image`] on every change.

use crate::types::JsRasterImage;
use sketchlight_core::{EnhanceError, EnhancementParams as CoreParams};
use wasm_bindgen::prelude::*;

/// Enhancement parameters wrapper for JavaScript
#[wasm_bindgen]
pub struct EnhancementParams {
    inner: CoreParams,
}

#[wasm_bindgen]
impl EnhancementParams {
    /// Create parameters with the slider defaults
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: CoreParams::default(),
        }
    }

    /// Parameters that leave an image unchanged
    pub fn identity() -> Self {
        Self {
            inner: CoreParams::identity(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn light_intensity(&self) -> f32 {
        self.inner.light_intensity
    }

    #[wasm_bindgen(setter)]
    pub fn set_light_intensity(&mut self, value: f32) {
        self.inner.light_intensity = value;
    }

    #[wasm_bindgen(getter)]
    pub fn contrast(&self) -> f32 {
        self.inner.contrast
    }

    #[wasm_bindgen(setter)]
    pub fn set_contrast(&mut self, value: f32) {
        self.inner.contrast = value;
    }

    #[wasm_bindgen(getter)]
    pub fn vignette_strength(&self) -> f32 {
        self.inner.vignette_strength
    }

    #[wasm_bindgen(setter)]
    pub fn set_vignette_strength(&mut self, value: f32) {
        self.inner.vignette_strength = value;
    }

    /// Check whether these parameters leave the image unchanged
    pub fn is_identity(&self) -> bool {
        self.inner.is_identity()
    }

    /// Copy of these parameters pulled into the slider ranges
    pub fn clamped(&self) -> EnhancementParams {
        Self {
            inner: self.inner.clamped(),
        }
    }

    /// Serialize to a plain JS object
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Deserialize from a plain JS object
    pub fn from_json(value: JsValue) -> Result<EnhancementParams, JsValue> {
        let inner: CoreParams =
            serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { inner })
    }
}

impl Default for EnhancementParams {
    fn default() -> Self {
        Self::new()
    }
}

fn enhance_raster(
    image: &JsRasterImage,
    params: &EnhancementParams,
) -> Result<JsRasterImage, EnhanceError> {
    let mut raster = image.to_raster();
    sketchlight_core::enhance_in_place(&mut raster, &params.inner)?;
    Ok(JsRasterImage::from_raster(raster))
}

/// Apply the light, contrast and vignette pass to an image.
///
/// Returns a new image; the source is left untouched.
///
/// # Example (TypeScript)
/// ```typescript
/// const params = new EnhancementParams();
/// params.light_intensity = 0.4;
///
/// const enhanced = enhance_image(preview, params);
/// ctx.putImageData(new ImageData(new Uint8ClampedArray(enhanced.pixels()), enhanced.width), 0, 0);
/// ```
#[wasm_bindgen]
pub fn enhance_image(
    image: &JsRasterImage,
    params: &EnhancementParams,
) -> Result<JsRasterImage, JsValue> {
    enhance_raster(image, params).map_err(|e| JsValue::from_str(&e.to_string()))
}
