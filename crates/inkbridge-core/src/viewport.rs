//! Pan/zoom transform between screen and canvas coordinates.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest zoom reachable with the wheel.
pub const MIN_ZOOM: f64 = 0.5;
/// Largest zoom reachable with the wheel.
pub const MAX_ZOOM: f64 = 18.0;
/// Zoom change per wheel delta unit.
pub const WHEEL_ZOOM_STEP: f64 = 0.001;

/// Zoom level reached from `zoom` by a wheel delta; scrolling down zooms out.
pub fn zoom_after_wheel(zoom: f64, delta_y: f64) -> f64 {
    (zoom - delta_y * WHEEL_ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Viewport manages the view transform for the canvas.
///
/// Zoom 1 with no offset is the identity: screen and canvas coordinates agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current translation offset (pan)
    pub offset: Vec2,
    /// Current zoom level
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canvas to screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen to canvas transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn screen_to_canvas(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn canvas_to_screen(&self, canvas_point: Point) -> Point {
        self.transform() * canvas_point
    }

    /// Set an absolute zoom level, keeping the given screen point fixed.
    pub fn zoom_to_point(&mut self, screen_point: Point, zoom: f64) {
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if (zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let anchor = self.screen_to_canvas(screen_point);
        self.zoom = zoom;
        let moved = self.canvas_to_screen(anchor);
        self.offset += Vec2::new(screen_point.x - moved.x, screen_point.y - moved.y);
    }

    /// Zoom level reached from the current one by a wheel delta.
    pub fn wheel_zoom(&self, delta_y: f64) -> f64 {
        zoom_after_wheel(self.zoom, delta_y)
    }

    /// Back to the identity transform.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_identity(&self) -> bool {
        self.offset == Vec2::ZERO && (self.zoom - 1.0).abs() < f64::EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        let viewport = Viewport::new();
        assert!(viewport.is_identity());
        let p = Point::new(100.0, 200.0);
        assert_eq!(viewport.screen_to_canvas(p), p);
    }

    #[test]
    fn test_screen_to_canvas_with_offset_and_zoom() {
        let viewport = Viewport {
            offset: Vec2::new(50.0, 100.0),
            zoom: 2.0,
        };
        let canvas = viewport.screen_to_canvas(Point::new(150.0, 300.0));
        assert!((canvas.x - 50.0).abs() < 1e-10);
        assert!((canvas.y - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_to_point_keeps_anchor() {
        let mut viewport = Viewport::new();
        let anchor = Point::new(120.0, 80.0);
        let before = viewport.screen_to_canvas(anchor);
        viewport.zoom_to_point(anchor, 3.0);
        let after = viewport.screen_to_canvas(anchor);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
        assert!((viewport.zoom - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wheel_zoom_is_clamped() {
        let viewport = Viewport::new();
        assert!((viewport.wheel_zoom(-100.0) - 1.1).abs() < 1e-9);
        assert!((viewport.wheel_zoom(10_000.0) - MIN_ZOOM).abs() < f64::EPSILON);
        assert!((viewport.wheel_zoom(-100_000.0) - MAX_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reset() {
        let mut viewport = Viewport::new();
        viewport.zoom_to_point(Point::new(10.0, 10.0), 4.0);
        assert!(!viewport.is_identity());
        viewport.reset();
        assert!(viewport.is_identity());
    }
}
