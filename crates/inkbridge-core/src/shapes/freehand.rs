//! Freehand drawing shape, produced by the brush.

use super::{ShapeId, ShapeStyle, ShapeTrait, point_to_polyline_dist, points_bounds};
use kurbo::{Affine, BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A freehand drawing (series of points).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Freehand {
    #[serde(default = "Uuid::new_v4")]
    pub(crate) id: ShapeId,
    /// Points in the freehand path.
    pub points: Vec<Point>,
    /// Style properties.
    #[serde(default)]
    pub style: ShapeStyle,
}

impl Freehand {
    /// Create from existing points.
    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            style: ShapeStyle::default(),
        }
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl ShapeTrait for Freehand {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        points_bounds(&self.points)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        point_to_polyline_dist(point, &self.points) <= tolerance + self.style.stroke_width / 2.0
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some(first) = self.points.first() else {
            return path;
        };
        path.move_to(*first);
        if self.points.len() == 1 {
            // A bare click still paints a dot.
            path.line_to(*first);
        }
        for point in self.points.iter().skip(1) {
            path.line_to(*point);
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

    #[test]
    fn test_bounds() {
        let path = Freehand::from_points(vec![
            Point::new(10.0, 20.0),
            Point::new(50.0, 5.0),
            Point::new(30.0, 40.0),
        ]);
        assert_eq!(path.bounds(), Rect::new(10.0, 5.0, 50.0, 40.0));
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_hit_test_uses_stroke_width() {
        let mut path = Freehand::from_points(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
        path.style.stroke_width = 20.0;
        assert!(path.hit_test(Point::new(50.0, 9.0), 0.0));
        assert!(!path.hit_test(Point::new(50.0, 15.0), 0.0));
    }

    #[test]
    fn test_single_point_path_is_drawable() {
        let dot = Freehand::from_points(vec![Point::new(5.0, 5.0)]);
        assert_eq!(dot.to_path().elements().len(), 2);
    }
}
