//! Preview enhancement pipeline
//!
//! Applies the three client-side effects to RGBA pixel data.
//!
//! ## Stage Order
//! 1. Contrast/levels
//! 2. Directional light overlay
//! 3. Vignette
//!
//! Each stage reads and writes the whole buffer and stores rounded 8-bit
//! values, so stage `n + 1` sees exactly what a canvas would hold after
//! stage `n`. Alpha is never touched.

use crate::raster::{RasterImage, CHANNELS};
use crate::EnhancementParams;
use thiserror::Error;

/// Light direction in normalized `[-1, 1]` image space (upper left).
pub const LIGHT_DIRECTION: (f32, f32) = (-0.6, -0.8);

/// Peak brightening of the key light at full intensity.
const LIGHT_GAIN: f32 = 0.8;

/// Vignette exponent applied to the normalized radius.
const VIGNETTE_FALLOFF: f32 = 1.5;

/// Errors that can occur when enhancing an image.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnhanceError {
    /// Pixel buffer length doesn't match the dimensions
    #[error(
        "Invalid image: {width}x{height} needs {expected} bytes (width * height * 4), got {actual}"
    )]
    InvalidImage {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Enhance an image, returning a new image and leaving the input untouched.
///
/// # Arguments
/// * `image` - RGBA source image
/// * `params` - Light, contrast and vignette settings
///
/// # Errors
///
/// Returns `EnhanceError::InvalidImage` if the buffer length doesn't equal
/// `width * height * 4`. No pixels are processed in that case.
pub fn enhance(image: &RasterImage, params: &EnhancementParams) -> Result<RasterImage, EnhanceError> {
    image.validate()?;
    let mut output = image.clone();
    enhance_in_place(&mut output, params)?;
    Ok(output)
}

/// Enhance an image's pixel data in place.
///
/// Same pipeline as [`enhance`], for callers that own the buffer and don't
/// need the original afterwards.
pub fn enhance_in_place(
    image: &mut RasterImage,
    params: &EnhancementParams,
) -> Result<(), EnhanceError> {
    image.validate()?;
    if image.is_empty() || params.is_identity() {
        return Ok(());
    }

    let (width, height) = (image.width, image.height);
    apply_contrast(&mut image.pixels, params.contrast);
    apply_light(&mut image.pixels, width, height, params.light_intensity);
    apply_vignette(&mut image.pixels, width, height, params.vignette_strength);
    Ok(())
}

/// Contrast curve factor for a contrast multiplier.
///
/// The multiplier is mapped onto the classic `[-255, 255]` contrast scale as
/// `C = (contrast - 1) * 255`, then
/// `f = 259 * (C + 255) / (255 * (259 - C))`.
/// `contrast = 1.0` gives `f = 1`.
#[inline]
pub fn contrast_factor(contrast: f32) -> f32 {
    let c = (contrast - 1.0) * 255.0;
    (259.0 * (c + 255.0)) / (255.0 * (259.0 - c))
}

/// Brightness multiplier of the key light at pixel `(x, y)`.
///
/// Tent falloff around [`LIGHT_DIRECTION`]:
/// `lambert = max(0, (1 - |nx - lx|) * (1 - |ny - ly|))`,
/// `light = 1 + lambert * intensity * 0.8`.
#[inline]
pub fn light_multiplier(x: u32, y: u32, width: u32, height: u32, intensity: f32) -> f32 {
    let (lx, ly) = LIGHT_DIRECTION;
    let nx = (x as f32 / width as f32) * 2.0 - 1.0;
    let ny = (y as f32 / height as f32) * 2.0 - 1.0;
    let lambert = ((1.0 - (nx - lx).abs()) * (1.0 - (ny - ly).abs())).max(0.0);
    1.0 + lambert * intensity * LIGHT_GAIN
}

/// Darkening multiplier of the vignette at pixel `(x, y)`.
///
/// `r` is the distance from the image center normalized so the corners sit at
/// `r = 1`; the multiplier is `1 - strength * r^1.5`.
#[inline]
pub fn vignette_multiplier(x: u32, y: u32, width: u32, height: u32, strength: f32) -> f32 {
    let dx = x as f32 / width as f32 - 0.5;
    let dy = y as f32 / height as f32 - 0.5;
    let r = (dx * dx + dy * dy).sqrt() / std::f32::consts::FRAC_1_SQRT_2;
    1.0 - strength * r.powf(VIGNETTE_FALLOFF)
}

/// Round and clamp a channel value into `0..=255`.
#[inline]
fn to_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Stretch R, G and B away from (or toward) mid-gray 128.
fn apply_contrast(pixels: &mut [u8], contrast: f32) {
    let factor = contrast_factor(contrast);
    if factor == 1.0 {
        return;
    }
    for px in pixels.chunks_exact_mut(CHANNELS) {
        for channel in &mut px[..3] {
            *channel = to_channel(factor * (*channel as f32 - 128.0) + 128.0);
        }
    }
}

/// Brighten toward the upper-left key light.
fn apply_light(pixels: &mut [u8], width: u32, height: u32, intensity: f32) {
    if intensity == 0.0 {
        return;
    }
    for y in 0..height {
        for x in 0..width {
            let light = light_multiplier(x, y, width, height, intensity);
            scale_rgb(pixels, pixel_index(x, y, width), light);
        }
    }
}

/// Darken toward the corners.
fn apply_vignette(pixels: &mut [u8], width: u32, height: u32, strength: f32) {
    if strength == 0.0 {
        return;
    }
    for y in 0..height {
        for x in 0..width {
            let v = vignette_multiplier(x, y, width, height, strength);
            scale_rgb(pixels, pixel_index(x, y, width), v);
        }
    }
}

#[inline]
fn pixel_index(x: u32, y: u32, width: u32) -> usize {
    (y as usize * width as usize + x as usize) * CHANNELS
}

#[inline]
fn scale_rgb(pixels: &mut [u8], idx: usize, multiplier: f32) {
    for channel in &mut pixels[idx..idx + 3] {
        *channel = to_channel(*channel as f32 * multiplier);
    }
}
