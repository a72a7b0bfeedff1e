//! Sketch decoding for the preview pipeline.
//!
//! This module turns the bytes of an uploaded sketch into a [`RasterImage`]
//! ready for enhancement:
//! - Decoding PNG or JPEG data to RGBA
//! - Applying the EXIF orientation, as a browser does when drawing to a canvas
//! - Downscaling to the preview width
//!
//! # Examples
//!
//! ```ignore
//! use sketchlight_core::decode::{decode_image, fit_to_width, PREVIEW_MAX_WIDTH};
//!
//! let bytes = std::fs::read("sketch.png").unwrap();
//! let sketch = decode_image(&bytes).unwrap();
//! let preview = fit_to_width(&sketch, PREVIEW_MAX_WIDTH).unwrap();
//! println!("Preview {}x{}", preview.width, preview.height);
//! ```
//!
//! [`RasterImage`]: crate::RasterImage

mod resize;
mod sketch;
mod types;

pub use resize::{fit_dimensions, fit_to_width, PREVIEW_MAX_WIDTH};
pub use sketch::decode_image;
pub use types::{DecodeError, Orientation};
