//! Editable text box.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Line height multiplier applied to the font size.
pub const LINE_HEIGHT: f64 = 1.16;

/// A text box with a fixed width that wraps nothing; each `\n` starts a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    #[serde(default = "Uuid::new_v4")]
    pub(crate) id: ShapeId,
    /// Top-left corner of the box.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub content: String,
    pub font_family: String,
    pub font_size: f64,
    /// Text color lives in `stroke_color`, matching the tool palette.
    #[serde(default)]
    pub style: ShapeStyle,
}

impl Text {
    pub fn new(position: Point, font_family: impl Into<String>, font_size: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width: 0.0,
            height: 0.0,
            content: String::new(),
            font_family: font_family.into(),
            font_size,
            style: ShapeStyle::default(),
        }
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }

    pub fn line_count(&self) -> usize {
        self.lines().count()
    }

    /// Whether the box holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }
}

impl ShapeTrait for Text {
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
    }
}
