//! In-memory RGBA raster images.

use crate::enhance::EnhanceError;

/// Bytes per pixel in a [`RasterImage`] buffer (red, green, blue, alpha).
pub const CHANNELS: usize = 4;

/// An image held entirely in memory as 8-bit RGBA pixels.
///
/// The layout matches a browser canvas `ImageData` buffer, so previews can be
/// handed back and forth without conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    /// Length must be width * height * 4.
    pub pixels: Vec<u8>,
}

impl RasterImage {
    /// Create a raster image, checking the buffer against the dimensions.
    ///
    /// # Errors
    ///
    /// Returns `EnhanceError::InvalidImage` if `pixels.len() != width * height * 4`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, EnhanceError> {
        let image = Self {
            width,
            height,
            pixels,
        };
        image.validate()?;
        Ok(image)
    }

    /// Create an image filled with a single RGBA color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a RasterImage from an image::RgbaImage.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Convert to an image::RgbaImage for codec and resampling work.
    ///
    /// Returns `None` if the buffer does not match the dimensions.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Buffer length implied by the dimensions, or `None` if it overflows `usize`.
    pub fn expected_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(CHANNELS)
    }

    /// Check the buffer length invariant.
    ///
    /// Dimensions whose byte length overflows `usize` can never be satisfied
    /// and report `expected` as `usize::MAX`.
    pub fn validate(&self) -> Result<(), EnhanceError> {
        match self.expected_len() {
            Some(expected) if expected == self.pixels.len() => Ok(()),
            expected => Err(EnhanceError::InvalidImage {
                width: self.width,
                height: self.height,
                expected: expected.unwrap_or(usize::MAX),
                actual: self.pixels.len(),
            }),
        }
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check if the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// RGBA value at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let px = self.pixels.get(idx..idx + CHANNELS)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}
