//! InkBridge Render Library
//!
//! CPU implementations of the services the core engine leaves external:
//! a tiny-skia rasterizer for eraser cutouts and an image loader that
//! decodes embedded images.

mod decode;
mod rasterizer;

pub use decode::{DecodingLoader, decode_dimensions};
pub use rasterizer::{RenderError, SkiaRasterizer};
