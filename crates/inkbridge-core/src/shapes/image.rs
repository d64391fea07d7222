//! Raster image placed on the canvas.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An image shape. `src` is a URL or a `data:` URL; `width`/`height` are
/// the natural pixel size and the scale factors stretch it on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default = "Uuid::new_v4")]
    pub(crate) id: ShapeId,
    /// Top-left corner position.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    #[serde(default = "unit_scale")]
    pub scale_x: f64,
    #[serde(default = "unit_scale")]
    pub scale_y: f64,
    pub src: String,
    #[serde(default)]
    pub style: ShapeStyle,
}

fn unit_scale() -> f64 {
    1.0
}

impl Image {
    /// Create an image at its natural size.
    pub fn new(position: Point, src: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width: f64::from(width),
            height: f64::from(height),
            scale_x: 1.0,
            scale_y: 1.0,
            src: src.into(),
            style: ShapeStyle::default(),
        }
    }

    /// Build a `data:` URL from raw bytes.
    pub fn data_url(mime: &str, bytes: &[u8]) -> String {
        format!("data:{mime};base64,{}", STANDARD.encode(bytes))
    }

    /// Decode the payload of a base64 `data:` URL.
    pub fn decode_data_url(src: &str) -> Option<Vec<u8>> {
        let rest = src.strip_prefix("data:")?;
        let (meta, payload) = rest.split_once(',')?;
        if !meta.ends_with(";base64") {
            return None;
        }
        STANDARD.decode(payload).ok()
    }

    /// Raw bytes when the source is embedded.
    pub fn data(&self) -> Option<Vec<u8>> {
        Self::decode_data_url(&self.src)
    }

    /// Displayed bounding rectangle.
    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width * self.scale_x,
            self.position.y + self.height * self.scale_y,
        )
    }
}

impl ShapeTrait for Image {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_rect().inflate(tolerance, tolerance).contains(point)
    }

    fn to_path(&self) -> BezPath {
        self.as_rect().to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        self.position = affine * self.position;
        let scale = affine.as_coeffs();
        self.scale_x *= scale[0].abs();
        self.scale_y *= scale[3].abs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_round_trip() {
        let url = Image::data_url("image/png", &[1, 2, 3]);
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(Image::decode_data_url(&url), Some(vec![1, 2, 3]));
        assert_eq!(Image::decode_data_url("https://example.com/a.png"), None);
    }

    #[test]
    fn test_bounds_apply_scale() {
        let mut img = Image::new(Point::new(10.0, 10.0), "a.png", 40, 20);
        img.scale_x = 2.0;
        img.scale_y = 0.5;
        assert_eq!(img.bounds(), Rect::new(10.0, 10.0, 90.0, 20.0));
    }
}
