//! Image loading from a local asset directory.

use inkbridge_core::services::{BoxFuture, ImageLoader, ImageSource, LoadError, LoadedImage};
use inkbridge_render::{DecodingLoader, decode_dimensions};
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Serves URLs from files under `root` and answers file-picker requests
/// with a fixed file.
#[derive(Debug, Clone)]
pub struct FsImageLoader {
    root: PathBuf,
    pick: Option<PathBuf>,
}

impl FsImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pick: None,
        }
    }

    /// File handed back whenever a tool opens the file chooser. Without one
    /// the chooser behaves as if dismissed.
    pub fn with_pick(mut self, pick: Option<PathBuf>) -> Self {
        self.pick = pick;
        self
    }

    /// Map a URL onto a file below the asset root. Only the path of the URL
    /// is used; anything trying to climb out of the root is rejected.
    fn resolve(&self, url: &str) -> Option<PathBuf> {
        let path = match Url::parse(url) {
            Ok(parsed) => parsed.path().to_string(),
            Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
        };
        let relative = Path::new(path.trim_start_matches('/'));
        if relative.components().any(|c| !matches!(c, Component::Normal(_))) {
            return None;
        }
        Some(self.root.join(relative))
    }

    fn read(path: &Path) -> Result<Vec<u8>, LoadError> {
        std::fs::read(path).map_err(|err| {
            log::debug!("reading {}: {err}", path.display());
            LoadError::NotFound(path.display().to_string())
        })
    }

    fn load_now(&self, source: ImageSource) -> Result<LoadedImage, LoadError> {
        match source {
            ImageSource::Url(url) => {
                let path = self.resolve(&url).ok_or_else(|| LoadError::NotFound(url.clone()))?;
                let (width, height) = decode_dimensions(&Self::read(&path)?)?;
                Ok(LoadedImage {
                    src: url,
                    width,
                    height,
                })
            }
            ImageSource::DataUrl(_) => DecodingLoader.load_now(source),
            ImageSource::UserFile => {
                let path = self.pick.as_deref().ok_or(LoadError::Cancelled)?;
                DecodingLoader::embed(&Self::read(path)?)
            }
        }
    }
}

impl ImageLoader for FsImageLoader {
    fn load(&self, source: ImageSource) -> BoxFuture<'static, Result<LoadedImage, LoadError>> {
        Box::pin(std::future::ready(self.load_now(source)))
    }
}
