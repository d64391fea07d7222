//! Drawable objects that live on the canvas and inside snapshots.

mod ellipse;
mod freehand;
mod glyph;
mod image;
mod line;
mod polygon;
mod rectangle;
mod text;

pub use ellipse::Ellipse;
pub use freehand::Freehand;
pub use glyph::Glyph;
pub use image::Image;
pub use line::Line;
pub use polygon::Polygon;
pub use rectangle::Rectangle;
pub use text::{LINE_HEIGHT, Text};

use kurbo::{Affine, BezPath, Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Format as a CSS `rgba()` string.
    pub fn to_css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.r,
            self.g,
            self.b,
            f64::from(self.a) / 255.0
        )
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Parse a CSS color as sent by the host.
///
/// Supports `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()` and a handful
/// of named colors. Empty strings and `transparent` yield a fully
/// transparent color.
pub fn parse_css_color(input: &str) -> Option<SerializableColor> {
    let s = input.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("transparent") {
        return Some(SerializableColor::transparent());
    }

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = s.to_ascii_lowercase();
    if let Some(args) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_args(args);
    }

    named_color(&lower)
}

fn parse_hex(hex: &str) -> Option<SerializableColor> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    let short = |c: char| {
        let v = c.to_digit(16)? as u8;
        Some(v * 16 + v)
    };
    let chars: Vec<char> = hex.chars().collect();
    match hex.len() {
        3 => Some(SerializableColor::new(
            short(chars[0])?,
            short(chars[1])?,
            short(chars[2])?,
            255,
        )),
        6 => Some(SerializableColor::new(
            channel(hex.get(0..2)?)?,
            channel(hex.get(2..4)?)?,
            channel(hex.get(4..6)?)?,
            255,
        )),
        8 => Some(SerializableColor::new(
            channel(hex.get(0..2)?)?,
            channel(hex.get(2..4)?)?,
            channel(hex.get(4..6)?)?,
            channel(hex.get(6..8)?)?,
        )),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<SerializableColor> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |s: &str| -> Option<u8> {
        let v: f64 = s.parse().ok()?;
        Some(v.clamp(0.0, 255.0).round() as u8)
    };
    let alpha = match parts.get(3) {
        Some(a) => {
            let v: f64 = a.parse().ok()?;
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };
    Some(SerializableColor::new(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}

fn named_color(name: &str) -> Option<SerializableColor> {
    let (r, g, b) = match name {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "lime" => (0, 255, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "gray" | "grey" => (128, 128, 128),
        "pink" => (255, 192, 203),
        "brown" => (165, 42, 42),
        "cyan" => (0, 255, 255),
        "magenta" => (255, 0, 255),
        _ => return None,
    };
    Some(SerializableColor::new(r, g, b, 255))
}

/// Style properties for shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke color.
    pub stroke_color: SerializableColor,
    /// Stroke width.
    pub stroke_width: f64,
    /// Fill color (None = no fill).
    pub fill_color: Option<SerializableColor>,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl ShapeStyle {
    pub fn new(stroke_color: SerializableColor, stroke_width: f64) -> Self {
        Self {
            stroke_color,
            stroke_width,
            ..Self::default()
        }
    }

    pub fn with_fill(mut self, fill: Option<SerializableColor>) -> Self {
        self.fill_color = fill.filter(|c| !c.is_transparent());
        self
    }

    /// Get the stroke color as a peniko Color.
    pub fn stroke(&self) -> Color {
        self.stroke_color.into()
    }

    /// Get the stroke color with opacity applied.
    pub fn stroke_with_opacity(&self) -> Color {
        with_opacity(self.stroke_color, self.opacity)
    }

    /// Get the fill color as a peniko Color.
    pub fn fill(&self) -> Option<Color> {
        self.fill_color.map(|c| c.into())
    }

    /// Get the fill color with opacity applied.
    pub fn fill_with_opacity(&self) -> Option<Color> {
        self.fill_color.map(|c| with_opacity(c, self.opacity))
    }
}

fn with_opacity(color: SerializableColor, opacity: f64) -> Color {
    let alpha = (f64::from(color.a) * opacity.clamp(0.0, 1.0)) as u8;
    Color::from_rgba8(color.r, color.g, color.b, alpha)
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            stroke_width: 2.0,
            fill_color: None,
            opacity: 1.0,
        }
    }
}

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Distance from a point to a line segment (a to b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => (point - *only).hypot(),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Bounding box of a point cloud, or `Rect::ZERO` when empty.
pub(crate) fn points_bounds(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |acc, p| {
            acc.union_pt(*p)
        })
}

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Get the bounding box in canvas coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point (in canvas coordinates) hits this shape.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Get the path representation for rendering.
    fn to_path(&self) -> BezPath;

    /// Get the style.
    fn style(&self) -> &ShapeStyle;

    /// Get mutable style.
    fn style_mut(&mut self) -> &mut ShapeStyle;

    /// Apply a transform to this shape.
    fn transform(&mut self, affine: Affine);
}

/// Every object kind a snapshot can contain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Rect(Rectangle),
    Circle(Ellipse),
    Line(Line),
    Polygon(Polygon),
    Path(Freehand),
    Textbox(Text),
    Image(Image),
    Glyph(Glyph),
}

impl Shape {
    pub fn id(&self) -> ShapeId {
        match self {
            Shape::Rect(s) => s.id(),
            Shape::Circle(s) => s.id(),
            Shape::Line(s) => s.id(),
            Shape::Polygon(s) => s.id(),
            Shape::Path(s) => s.id(),
            Shape::Textbox(s) => s.id(),
            Shape::Image(s) => s.id(),
            Shape::Glyph(s) => s.id(),
        }
    }

    /// The serialized `type` tag of this object.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Rect(_) => "rect",
            Shape::Circle(_) => "circle",
            Shape::Line(_) => "line",
            Shape::Polygon(_) => "polygon",
            Shape::Path(_) => "path",
            Shape::Textbox(_) => "textbox",
            Shape::Image(_) => "image",
            Shape::Glyph(_) => "glyph",
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Rect(s) => s.bounds(),
            Shape::Circle(s) => s.bounds(),
            Shape::Line(s) => s.bounds(),
            Shape::Polygon(s) => s.bounds(),
            Shape::Path(s) => s.bounds(),
            Shape::Textbox(s) => s.bounds(),
            Shape::Image(s) => s.bounds(),
            Shape::Glyph(s) => s.bounds(),
        }
    }

    /// Bounds grown by half the stroke width, i.e. the painted area.
    pub fn painted_bounds(&self) -> Rect {
        let half = self.style().stroke_width / 2.0;
        match self {
            Shape::Image(_) | Shape::Textbox(_) | Shape::Glyph(_) => self.bounds(),
            _ => self.bounds().inflate(half, half),
        }
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self {
            Shape::Rect(s) => s.hit_test(point, tolerance),
            Shape::Circle(s) => s.hit_test(point, tolerance),
            Shape::Line(s) => s.hit_test(point, tolerance),
            Shape::Polygon(s) => s.hit_test(point, tolerance),
            Shape::Path(s) => s.hit_test(point, tolerance),
            Shape::Textbox(s) => s.hit_test(point, tolerance),
            Shape::Image(s) => s.hit_test(point, tolerance),
            Shape::Glyph(s) => s.hit_test(point, tolerance),
        }
    }

    pub fn to_path(&self) -> BezPath {
        match self {
            Shape::Rect(s) => s.to_path(),
            Shape::Circle(s) => s.to_path(),
            Shape::Line(s) => s.to_path(),
            Shape::Polygon(s) => s.to_path(),
            Shape::Path(s) => s.to_path(),
            Shape::Textbox(s) => s.to_path(),
            Shape::Image(s) => s.to_path(),
            Shape::Glyph(s) => s.to_path(),
        }
    }

    pub fn style(&self) -> &ShapeStyle {
        match self {
            Shape::Rect(s) => s.style(),
            Shape::Circle(s) => s.style(),
            Shape::Line(s) => s.style(),
            Shape::Polygon(s) => s.style(),
            Shape::Path(s) => s.style(),
            Shape::Textbox(s) => s.style(),
            Shape::Image(s) => s.style(),
            Shape::Glyph(s) => s.style(),
        }
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        match self {
            Shape::Rect(s) => s.style_mut(),
            Shape::Circle(s) => s.style_mut(),
            Shape::Line(s) => s.style_mut(),
            Shape::Polygon(s) => s.style_mut(),
            Shape::Path(s) => s.style_mut(),
            Shape::Textbox(s) => s.style_mut(),
            Shape::Image(s) => s.style_mut(),
            Shape::Glyph(s) => s.style_mut(),
        }
    }

    pub fn transform(&mut self, affine: Affine) {
        match self {
            Shape::Rect(s) => s.transform(affine),
            Shape::Circle(s) => s.transform(affine),
            Shape::Line(s) => s.transform(affine),
            Shape::Polygon(s) => s.transform(affine),
            Shape::Path(s) => s.transform(affine),
            Shape::Textbox(s) => s.transform(affine),
            Shape::Image(s) => s.transform(affine),
            Shape::Glyph(s) => s.transform(affine),
        }
    }

    /// Move the shape by an offset.
    pub fn translate(&mut self, offset: Vec2) {
        self.transform(Affine::translate(offset));
    }

    /// Check whether a stroke (polyline with a width) touches this shape's
    /// painted area.
    pub fn touched_by_stroke(&self, points: &[Point], stroke_width: f64) -> bool {
        let half = stroke_width / 2.0;
        let area = self.painted_bounds().inflate(half, half);
        match points {
            [] => false,
            [only] => area.contains(*only),
            _ => line_segments_intersect_rect(points, area),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Shape::Textbox(_))
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Shape::Textbox(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Shape::Textbox(t) => Some(t),
            _ => None,
        }
    }

    /// Check if this shape is an image.
    pub fn is_image(&self) -> bool {
        matches!(self, Shape::Image(_))
    }

    /// Get the image if this shape is an image.
    pub fn as_image(&self) -> Option<&Image> {
        match self {
            Shape::Image(img) => Some(img),
            _ => None,
        }
    }
}

/// Test if any line segment (defined by consecutive points) intersects or is inside a rectangle.
fn line_segments_intersect_rect(points: &[Point], rect: Rect) -> bool {
    // Any point inside the rect?
    if points.iter().any(|p| rect.contains(*p)) {
        return true;
    }
    // Any segment crosses a rect edge?
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ];
    let edges = [
        (corners[0], corners[1]),
        (corners[1], corners[2]),
        (corners[2], corners[3]),
        (corners[3], corners[0]),
    ];
    points.windows(2).any(|w| {
        edges
            .iter()
            .any(|&(c, d)| segments_intersect(w[0], w[1], c, d))
    })
}

/// Test if two line segments (a-b) and (c-d) intersect.
fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let cross = |o: Point, p: Point, q: Point| -> f64 {
        (p.x - o.x) * (q.y - o.y) - (p.y - o.y) * (q.x - o.x)
    };
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    // Collinear: endpoint lies on the other segment
    let on_segment = |p: Point, q: Point, r: Point| -> bool {
        r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
    };
    (d1.abs() < 1e-10 && on_segment(c, d, a))
        || (d2.abs() < 1e-10 && on_segment(c, d, b))
        || (d3.abs() < 1e-10 && on_segment(a, b, c))
        || (d4.abs() < 1e-10 && on_segment(a, b, d))
}
