//! Polygon shape, open while it is being built and closed once finished.

use super::{ShapeId, ShapeStyle, ShapeTrait, point_to_polyline_dist, points_bounds};
use kurbo::{Affine, BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    #[serde(default = "Uuid::new_v4")]
    pub(crate) id: ShapeId,
    pub points: Vec<Point>,
    /// Open polygons render as a polyline without fill.
    #[serde(default = "default_closed")]
    pub closed: bool,
    #[serde(default)]
    pub style: ShapeStyle,
}

fn default_closed() -> bool {
    true
}

impl Polygon {
    /// An open polyline, used as the preview while vertices are placed.
    pub fn open(points: Vec<Point>) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            closed: false,
            style: ShapeStyle::default(),
        }
    }

    pub fn closed(points: Vec<Point>) -> Self {
        Self {
            closed: true,
            ..Self::open(points)
        }
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    /// Even-odd containment test for closed polygons.
    pub fn contains(&self, point: Point) -> bool {
        if !self.closed || self.points.len() < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = self.points.len() - 1;
        for i in 0..self.points.len() {
            let (a, b) = (self.points[i], self.points[j]);
            if (a.y > point.y) != (b.y > point.y)
                && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    fn outline(&self) -> Vec<Point> {
        let mut outline = self.points.clone();
        if self.closed {
            if let Some(first) = self.points.first() {
                outline.push(*first);
            }
        }
        outline
    }
}

impl ShapeTrait for Polygon {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        points_bounds(&self.points)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        if self.style.fill_color.is_some() && self.contains(point) {
            return true;
        }
        point_to_polyline_dist(point, &self.outline()) <= tolerance + self.style.stroke_width / 2.0
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some(first) = self.points.first() else {
            return path;
        };
        path.move_to(*first);
        for point in &self.points[1..] {
            path.line_to(*point);
        }
        if self.closed {
            path.close_path();
        }
        path
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        for point in &mut self.points {
            *point = affine * *point;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::SerializableColor;

    fn triangle() -> Polygon {
        Polygon::closed(vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(0.0, 100.0),
        ])
    }

    #[test]
    fn test_contains() {
        let poly = triangle();
        assert!(poly.contains(Point::new(10.0, 10.0)));
        assert!(!poly.contains(Point::new(90.0, 90.0)));
    }

    #[test]
    fn test_open_polygon_only_hits_outline() {
        let mut poly = triangle();
        poly.closed = false;
        poly.style.fill_color = Some(SerializableColor::white());
        assert!(!poly.hit_test(Point::new(10.0, 10.0), 1.0));
        assert!(poly.hit_test(Point::new(50.0, 0.0), 1.0));
    }

    #[test]
    fn test_closed_path_has_close_segment() {
        let path = triangle().to_path();
        assert!(matches!(path.elements().last(), Some(kurbo::PathEl::ClosePath)));
    }
}
