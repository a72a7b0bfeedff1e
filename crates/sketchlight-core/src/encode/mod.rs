//! Preview export.
//!
//! Enhanced previews are written out as PNG so the alpha channel survives.
//!
//! # Examples
//!
//! ```ignore
//! use sketchlight_core::{encode::encode_png, RasterImage};
//!
//! let img = RasterImage::filled(100, 100, [128, 128, 128, 255]);
//! let png_bytes = encode_png(&img).unwrap();
//! println!("Encoded {} bytes", png_bytes.len());
//! ```

mod png;

pub use png::{encode_png, EncodeError};
