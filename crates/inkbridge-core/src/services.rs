//! External capabilities the engine depends on: fetching/decoding images
//! and rasterizing objects.

use crate::input::Stroke;
use crate::shapes::{Image, Shape};
use kurbo::Rect;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Fetched over the network or from the host's static files.
    Url(String),
    /// Embedded `data:` URL.
    DataUrl(String),
    /// Picked by the user through a file chooser.
    UserFile,
}

/// A decoded image ready to be placed on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    /// `src` to store in the image object.
    pub src: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("image not found: {0}")]
    NotFound(String),
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("unsupported image source: {0}")]
    Unsupported(String),
    #[error("image selection cancelled")]
    Cancelled,
}

/// Loads images asynchronously. The returned future must not borrow the loader.
pub trait ImageLoader {
    fn load(&self, source: ImageSource) -> BoxFuture<'static, Result<LoadedImage, LoadError>>;
}

/// A PNG raster produced for the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl RasterImage {
    pub fn to_data_url(&self) -> String {
        Image::data_url("image/png", &self.png)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RasterError {
    #[error("nothing to rasterize in a {0}x{1} area")]
    EmptyArea(u32, u32),
    #[error("failed to encode raster: {0}")]
    Encode(String),
}

/// Objects to flatten together with the eraser stroke cut out of them.
#[derive(Debug, Clone, Copy)]
pub struct CutoutRequest<'a> {
    pub objects: &'a [Shape],
    pub eraser: &'a Stroke,
    /// Canvas area covered by the result; its origin maps to pixel (0, 0).
    pub bounds: Rect,
}

pub trait Rasterizer {
    /// Whether `shape` can be flattened into a cutout. The eraser leaves
    /// anything else on the canvas as it is.
    fn can_paint(&self, _shape: &Shape) -> bool {
        true
    }

    fn rasterize_cutout(&self, request: &CutoutRequest<'_>) -> Result<RasterImage, RasterError>;
}

/// The external services handed to the orchestrator.
pub struct Services {
    pub loader: Box<dyn ImageLoader>,
    pub rasterizer: Box<dyn Rasterizer>,
}

impl Services {
    pub fn new(loader: impl ImageLoader + 'static, rasterizer: impl Rasterizer + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            rasterizer: Box::new(rasterizer),
        }
    }
}
