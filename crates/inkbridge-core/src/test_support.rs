//! Fake services for unit tests.

use crate::services::{
    BoxFuture, CutoutRequest, ImageLoader, ImageSource, LoadError, LoadedImage, RasterError,
    RasterImage, Rasterizer,
};
use crate::shapes::{Image, Shape};
use futures::channel::oneshot;
use std::cell::RefCell;
use std::rc::Rc;

/// Size reported for any plain URL.
pub const URL_IMAGE_SIZE: (u32, u32) = (300, 200);
/// Size reported for a file picked by the user.
pub const USER_FILE_SIZE: (u32, u32) = (64, 32);

type Reply = oneshot::Sender<Result<LoadedImage, LoadError>>;

/// Loads from the source string alone.
///
/// URLs containing `missing` fail with `NotFound`. Data URLs written by
/// [`FakeRasterizer`] report the size encoded in their payload. A gated
/// loader holds every load until [`Gate::release_all`] is called.
#[derive(Default, Clone)]
pub struct FakeLoader {
    gate: Option<Gate>,
}

#[derive(Default, Clone)]
pub struct Gate {
    held: Rc<RefCell<Vec<(ImageSource, Reply)>>>,
}

impl Gate {
    pub fn held(&self) -> usize {
        self.held.borrow().len()
    }

    /// Resolve every held load with what an ungated loader would return.
    pub fn release_all(&self) {
        for (source, reply) in self.held.borrow_mut().drain(..) {
            let _ = reply.send(respond(&source));
        }
    }
}

impl FakeLoader {
    pub fn gated() -> (Self, Gate) {
        let gate = Gate::default();
        (
            Self {
                gate: Some(gate.clone()),
            },
            gate,
        )
    }
}

fn respond(source: &ImageSource) -> Result<LoadedImage, LoadError> {
    match source {
        ImageSource::Url(url) if url.contains("missing") => Err(LoadError::NotFound(url.clone())),
        ImageSource::Url(url) => Ok(LoadedImage {
            src: url.clone(),
            width: URL_IMAGE_SIZE.0,
            height: URL_IMAGE_SIZE.1,
        }),
        ImageSource::DataUrl(src) => {
            let payload = Image::decode_data_url(src)
                .ok_or_else(|| LoadError::Decode("not a data url".into()))?;
            let text = String::from_utf8_lossy(&payload);
            let (w, h) = text
                .split_once('x')
                .and_then(|(w, h)| Some((w.parse().ok()?, h.parse().ok()?)))
                .unwrap_or((1, 1));
            Ok(LoadedImage {
                src: src.clone(),
                width: w,
                height: h,
            })
        }
        ImageSource::UserFile => Ok(LoadedImage {
            src: "picked.png".into(),
            width: USER_FILE_SIZE.0,
            height: USER_FILE_SIZE.1,
        }),
    }
}

impl ImageLoader for FakeLoader {
    fn load(&self, source: ImageSource) -> BoxFuture<'static, Result<LoadedImage, LoadError>> {
        match &self.gate {
            None => Box::pin(std::future::ready(respond(&source))),
            Some(gate) => {
                let (tx, rx) = oneshot::channel();
                gate.held.borrow_mut().push((source, tx));
                Box::pin(async move { rx.await.unwrap_or(Err(LoadError::Cancelled)) })
            }
        }
    }
}

/// "Rasterizes" by writing the pixel size as the PNG payload.
pub struct FakeRasterizer;

impl Rasterizer for FakeRasterizer {
    fn can_paint(&self, shape: &Shape) -> bool {
        !matches!(shape, Shape::Textbox(_) | Shape::Glyph(_))
    }

    fn rasterize_cutout(&self, request: &CutoutRequest<'_>) -> Result<RasterImage, RasterError> {
        let width = request.bounds.width().ceil() as u32;
        let height = request.bounds.height().ceil() as u32;
        if width == 0 || height == 0 {
            return Err(RasterError::EmptyArea(width, height));
        }
        Ok(RasterImage {
            png: format!("{width}x{height}").into_bytes(),
            width,
            height,
        })
    }
}
