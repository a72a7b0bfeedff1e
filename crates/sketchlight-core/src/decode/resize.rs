//! Preview downscaling.
//!
//! Sketches are shrunk to a fixed maximum width before enhancement so the
//! per-pixel passes stay interactive. Images are never upscaled.

use image::imageops::FilterType;

use super::DecodeError;
use crate::RasterImage;

/// Maximum preview width in pixels.
pub const PREVIEW_MAX_WIDTH: u32 = 800;

/// Resize an image so it is at most `max_width` pixels wide.
///
/// The scale is `min(1, max_width / width)`, applied to both dimensions and
/// rounded to the nearest pixel. Images already narrow enough are cloned.
///
/// # Errors
///
/// Returns `DecodeError::InvalidSize` if `max_width` is zero, or
/// `DecodeError::CorruptedFile` if the source buffer doesn't match its dimensions.
pub fn fit_to_width(image: &RasterImage, max_width: u32) -> Result<RasterImage, DecodeError> {
    if max_width == 0 {
        return Err(DecodeError::InvalidSize(max_width));
    }

    let (new_width, new_height) = fit_dimensions(image.width, image.height, max_width);

    // Fast path: nothing to shrink
    if new_width == image.width && new_height == image.height {
        return Ok(image.clone());
    }

    let rgba = image
        .to_rgba_image()
        .ok_or_else(|| DecodeError::CorruptedFile("pixel buffer size mismatch".to_string()))?;

    // Bilinear, as a canvas drawImage would use
    let resized = image::imageops::resize(&rgba, new_width, new_height, FilterType::Triangle);
    Ok(RasterImage::from_rgba_image(resized))
}

/// Calculate preview dimensions for a maximum width, preserving aspect ratio.
pub fn fit_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width == 0 || height == 0 || width <= max_width {
        return (width, height);
    }

    let scale = max_width as f64 / width as f64;
    let new_width = (width as f64 * scale).round() as u32;
    let new_height = (height as f64 * scale).round() as u32;
    (new_width.max(1), new_height.max(1))
}
