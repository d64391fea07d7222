//! A single stamped glyph (emoji).

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    #[serde(default = "Uuid::new_v4")]
    pub(crate) id: ShapeId,
    /// Center of the glyph.
    pub center: Point,
    pub glyph: String,
    /// Edge length of the square the glyph occupies.
    pub size: f64,
    #[serde(default)]
    pub style: ShapeStyle,
}

impl Glyph {
    pub fn new(center: Point, glyph: impl Into<String>, size: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            glyph: glyph.into(),
            size,
            style: ShapeStyle::default(),
        }
    }
}

impl ShapeTrait for Glyph {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::from_center_size(self.center, (self.size, self.size))
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    fn to_path(&self) -> BezPath {
        self.bounds().to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        self.center = affine * self.center;
    }
}
