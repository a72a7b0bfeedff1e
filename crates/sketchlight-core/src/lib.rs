//! Sketchlight Core - Sketch preview processing
//!
//! This crate provides the client-side half of Sketchlight: decoding an
//! uploaded sketch, fitting it to the preview size, and running the
//! lighting/contrast/vignette enhancement pass over its RGBA pixels.

pub mod decode;
pub mod encode;
pub mod enhance;
pub mod raster;

pub use decode::{decode_image, fit_to_width, PREVIEW_MAX_WIDTH};
pub use encode::encode_png;
pub use enhance::{enhance, enhance_in_place, EnhanceError};
pub use raster::RasterImage;

/// Valid range for [`EnhancementParams::light_intensity`].
pub const LIGHT_INTENSITY_RANGE: (f32, f32) = (0.0, 1.0);

/// Valid range for [`EnhancementParams::contrast`].
pub const CONTRAST_RANGE: (f32, f32) = (0.8, 1.6);

/// Valid range for [`EnhancementParams::vignette_strength`].
pub const VIGNETTE_STRENGTH_RANGE: (f32, f32) = (0.0, 0.8);

/// Parameters for the preview enhancement pass.
///
/// The enhancer does not reject out-of-range values; range enforcement is the
/// caller's job (see [`EnhancementParams::clamped`]).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementParams {
    /// Strength of the directional key light (0.0 to 1.0)
    pub light_intensity: f32,
    /// Contrast multiplier (0.8 to 1.6, 1.0 = unchanged)
    pub contrast: f32,
    /// Vignette darkening at the corners (0.0 to 0.8)
    pub vignette_strength: f32,
}

impl Default for EnhancementParams {
    /// The slider positions the preview starts with.
    fn default() -> Self {
        Self {
            light_intensity: 0.25,
            contrast: 1.1,
            vignette_strength: 0.2,
        }
    }
}

impl EnhancementParams {
    pub fn new(light_intensity: f32, contrast: f32, vignette_strength: f32) -> Self {
        Self {
            light_intensity,
            contrast,
            vignette_strength,
        }
    }

    /// Parameters under which every stage leaves pixels unchanged.
    pub fn identity() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    /// Check if these parameters leave the image unchanged
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Return a copy with every field clamped to its slider range.
    pub fn clamped(&self) -> Self {
        Self {
            light_intensity: self
                .light_intensity
                .clamp(LIGHT_INTENSITY_RANGE.0, LIGHT_INTENSITY_RANGE.1),
            contrast: self.contrast.clamp(CONTRAST_RANGE.0, CONTRAST_RANGE.1),
            vignette_strength: self
                .vignette_strength
                .clamp(VIGNETTE_STRENGTH_RANGE.0, VIGNETTE_STRENGTH_RANGE.1),
        }
    }
}
