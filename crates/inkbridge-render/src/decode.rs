//! Image decoding for the loader side of the engine.

use inkbridge_core::services::{BoxFuture, ImageLoader, ImageSource, LoadError, LoadedImage};
use inkbridge_core::shapes::Image;

/// Natural pixel size of an encoded image.
pub fn decode_dimensions(bytes: &[u8]) -> Result<(u32, u32), LoadError> {
    let image = image::load_from_memory(bytes).map_err(|e| LoadError::Decode(e.to_string()))?;
    Ok((image.width(), image.height()))
}

/// Loader for images that arrive as bytes: embedded `data:` URLs here, and
/// whatever a caller reads from disk through [`DecodingLoader::embed`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DecodingLoader;

impl DecodingLoader {
    pub fn new() -> Self {
        Self
    }

    /// Turn raw image bytes into a loaded image with an embedded `data:` source.
    pub fn embed(bytes: &[u8]) -> Result<LoadedImage, LoadError> {
        let format = image::guess_format(bytes).map_err(|e| LoadError::Decode(e.to_string()))?;
        let (width, height) = decode_dimensions(bytes)?;
        Ok(LoadedImage {
            src: Image::data_url(format.to_mime_type(), bytes),
            width,
            height,
        })
    }

    /// Resolve a source without waiting.
    pub fn load_now(&self, source: ImageSource) -> Result<LoadedImage, LoadError> {
        match source {
            ImageSource::DataUrl(url) => {
                let bytes = Image::decode_data_url(&url)
                    .ok_or_else(|| LoadError::Decode("malformed data URL".to_string()))?;
                let (width, height) = decode_dimensions(&bytes)?;
                Ok(LoadedImage {
                    src: url,
                    width,
                    height,
                })
            }
            ImageSource::Url(url) => Err(LoadError::Unsupported(url)),
            ImageSource::UserFile => Err(LoadError::Unsupported("user file".to_string())),
        }
    }
}

impl ImageLoader for DecodingLoader {
    fn load(&self, source: ImageSource) -> BoxFuture<'static, Result<LoadedImage, LoadError>> {
        Box::pin(std::future::ready(self.load_now(source)))
    }
}
