//! In-memory drawing surface.
//!
//! `MemoryCanvas` is the reference [`CanvasAdapter`]: it keeps objects in a
//! map plus a z-order list, tracks selection and text editing, accumulates
//! brush strokes and drags the active object, all without any rendering.

use crate::adapter::{BackgroundImage, Brush, CanvasAdapter, CanvasError, NativeOutcome};
use crate::input::{MouseButton, PointerEvent, Stroke};
use crate::shapes::{Shape, ShapeId};
use crate::snapshot::{SNAPSHOT_VERSION, Snapshot};
use crate::viewport::Viewport;
use kurbo::{Point, Size};
use std::collections::{HashMap, HashSet};

/// Pointer slack when hit-testing objects.
pub const HIT_TOLERANCE: f64 = 4.0;

#[derive(Debug, Clone)]
pub struct MemoryCanvas {
    shapes: HashMap<ShapeId, Shape>,
    /// Back to front.
    z_order: Vec<ShapeId>,
    /// Format version of the last loaded snapshot, written back unchanged.
    version: String,
    background_color: Option<String>,
    background_image: Option<BackgroundImage>,
    size: Size,
    viewport: Viewport,
    active: Option<ShapeId>,
    editing: Option<ShapeId>,
    selection: bool,
    interactive: bool,
    brush: Option<Brush>,
    stroke: Vec<Point>,
    /// Object being dragged and the last pointer position.
    drag: Option<(ShapeId, Point)>,
}

impl MemoryCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            shapes: HashMap::new(),
            z_order: Vec::new(),
            version: SNAPSHOT_VERSION.to_string(),
            background_color: None,
            background_image: None,
            size: Size::new(width, height),
            viewport: Viewport::new(),
            active: None,
            editing: None,
            selection: true,
            interactive: true,
            brush: None,
            stroke: Vec::new(),
            drag: None,
        }
    }

    /// Objects back to front.
    pub fn shapes_ordered(&self) -> impl Iterator<Item = &Shape> {
        self.z_order.iter().filter_map(|id| self.shapes.get(id))
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn brush(&self) -> Option<Brush> {
        self.brush
    }

    pub fn selection_enabled(&self) -> bool {
        self.selection
    }

    pub fn objects_interactive(&self) -> bool {
        self.interactive
    }

    pub fn background_color(&self) -> Option<&str> {
        self.background_color.as_deref()
    }

    fn pointer_target(&self, point: Point) -> Option<ShapeId> {
        if self.interactive {
            self.top_object_at(point)
        } else {
            None
        }
    }

    fn on_down(&mut self, point: Point, button: MouseButton) -> NativeOutcome {
        if self.brush.is_some() {
            if button == MouseButton::Left {
                self.stroke = vec![point];
            }
            return NativeOutcome::default();
        }

        let target = self.pointer_target(point);
        if button == MouseButton::Left && (self.interactive || self.selection) {
            match target {
                Some(id) => {
                    self.active = Some(id);
                    self.drag = Some((id, point));
                    if self.editing.is_some_and(|editing| editing != id) {
                        self.editing = None;
                    }
                }
                None => {
                    self.active = None;
                    self.editing = None;
                }
            }
        }
        NativeOutcome {
            target,
            stroke: None,
        }
    }

    fn on_move(&mut self, point: Point) -> NativeOutcome {
        if self.brush.is_some() && !self.stroke.is_empty() {
            self.stroke.push(point);
            return NativeOutcome::default();
        }
        if let Some((id, last)) = self.drag {
            // Text in edit mode stays put so the caret can be placed.
            if self.editing != Some(id) {
                if let Some(shape) = self.shapes.get_mut(&id) {
                    shape.translate(point - last);
                }
            }
            self.drag = Some((id, point));
        }
        NativeOutcome {
            target: self.pointer_target(point),
            stroke: None,
        }
    }

    fn on_up(&mut self, point: Point) -> NativeOutcome {
        self.drag = None;
        if let Some(brush) = self.brush {
            if self.stroke.is_empty() {
                return NativeOutcome::default();
            }
            let mut points = std::mem::take(&mut self.stroke);
            if points.last() != Some(&point) {
                points.push(point);
            }
            return NativeOutcome {
                target: None,
                stroke: Some(Stroke {
                    points,
                    width: brush.width,
                    color: brush.color,
                }),
            };
        }
        NativeOutcome {
            target: self.pointer_target(point),
            stroke: None,
        }
    }
}

impl CanvasAdapter for MemoryCanvas {
    fn load(&mut self, snapshot: &Snapshot) -> Result<(), CanvasError> {
        let mut seen = HashSet::new();
        for shape in &snapshot.objects {
            if !seen.insert(shape.id()) {
                return Err(CanvasError::DuplicateObject(shape.id()));
            }
        }

        self.shapes.clear();
        self.z_order.clear();
        for shape in &snapshot.objects {
            self.z_order.push(shape.id());
            self.shapes.insert(shape.id(), shape.clone());
        }
        self.version = snapshot.version.clone();
        self.background_color = snapshot.background.clone();
        self.background_image = None;
        self.active = None;
        self.editing = None;
        self.drag = None;
        self.stroke.clear();
        Ok(())
    }

    fn serialize(&self) -> Snapshot {
        Snapshot {
            version: self.version.clone(),
            objects: self.shapes_ordered().cloned().collect(),
            background: self.background_color.clone(),
        }
    }

    fn size(&self) -> Size {
        self.size
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.size = Size::new(width, height);
    }

    fn add(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        if self.shapes.insert(id, shape).is_none() {
            self.z_order.push(id);
        }
        id
    }

    fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        self.z_order.retain(|&shape_id| shape_id != id);
        if self.active == Some(id) {
            self.active = None;
        }
        if self.editing == Some(id) {
            self.editing = None;
        }
        if self.drag.is_some_and(|(dragged, _)| dragged == id) {
            self.drag = None;
        }
        self.shapes.remove(&id)
    }

    fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(&id)
    }

    fn object_ids(&self) -> Vec<ShapeId> {
        self.z_order.clone()
    }

    fn objects_at(&self, point: Point) -> Vec<ShapeId> {
        self.z_order
            .iter()
            .rev()
            .filter(|id| {
                self.shapes
                    .get(id)
                    .is_some_and(|s| s.hit_test(point, HIT_TOLERANCE))
            })
            .copied()
            .collect()
    }

    fn active_object(&self) -> Option<ShapeId> {
        self.active
    }

    fn set_active_object(&mut self, id: Option<ShapeId>) {
        self.active = id.filter(|id| self.shapes.contains_key(id));
    }

    fn editing_object(&self) -> Option<ShapeId> {
        self.editing
    }

    fn set_editing_object(&mut self, id: Option<ShapeId>) {
        self.editing = id.filter(|id| self.shapes.get(id).is_some_and(Shape::is_text));
    }

    fn set_selection(&mut self, enabled: bool) {
        self.selection = enabled;
    }

    fn set_objects_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
        if !interactive {
            self.drag = None;
        }
    }

    fn set_brush(&mut self, brush: Option<Brush>) {
        self.brush = brush;
        self.stroke.clear();
    }

    fn handle_native(&mut self, event: &PointerEvent, point: Point) -> NativeOutcome {
        match event {
            PointerEvent::Down { button, .. } => self.on_down(point, *button),
            PointerEvent::Move { .. } => self.on_move(point),
            PointerEvent::Up { .. } => self.on_up(point),
            PointerEvent::DoubleClick { .. } => NativeOutcome {
                target: self.pointer_target(point),
                stroke: None,
            },
            PointerEvent::Out { .. } | PointerEvent::Wheel { .. } => NativeOutcome::default(),
        }
    }

    fn measure_text(&self, line: &str, font_family: &str, font_size: f64) -> f64 {
        // Average glyph advance relative to the font size.
        let factor = match font_family.to_ascii_lowercase().as_str() {
            "luckiest guy" => 0.62,
            "monospace" | "courier" | "courier new" => 0.6,
            _ => 0.55,
        };
        line.chars().count() as f64 * font_size * factor
    }

    fn to_canvas_point(&self, screen: Point) -> Point {
        self.viewport.screen_to_canvas(screen)
    }

    fn zoom(&self) -> f64 {
        self.viewport.zoom
    }

    fn zoom_to_point(&mut self, screen: Point, zoom: f64) {
        self.viewport.zoom_to_point(screen, zoom);
    }

    fn reset_viewport(&mut self) {
        self.viewport.reset();
    }

    fn set_background_image(&mut self, image: Option<BackgroundImage>) {
        self.background_image = image;
    }

    fn background_image(&self) -> Option<&BackgroundImage> {
        self.background_image.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Rectangle, SerializableColor, ShapeStyle, Text};

    fn filled_rect(x: f64, y: f64) -> Shape {
        Shape::Rect(
            Rectangle::new(Point::new(x, y), 100.0, 100.0)
                .with_style(ShapeStyle::default().with_fill(Some(SerializableColor::white()))),
        )
    }

    #[test]
    fn test_serialize_load_preserves_order() {
        let mut canvas = MemoryCanvas::new(600.0, 400.0);
        let a = canvas.add(filled_rect(0.0, 0.0));
        let b = canvas.add(filled_rect(50.0, 50.0));
        let snapshot = canvas.serialize();

        let mut other = MemoryCanvas::new(600.0, 400.0);
        other.load(&snapshot).unwrap();
        assert_eq!(other.object_ids(), vec![a, b]);
        assert_eq!(other.serialize(), snapshot);
    }

    #[test]
    fn test_serialize_echoes_loaded_version() {
        let mut snapshot = Snapshot::from_objects(vec![filled_rect(0.0, 0.0)]);
        snapshot.version = "5.3.0".into();
        let mut canvas = MemoryCanvas::new(600.0, 400.0);
        assert_eq!(canvas.serialize().version, SNAPSHOT_VERSION);
        canvas.load(&snapshot).unwrap();
        assert_eq!(canvas.serialize(), snapshot);
    }

    #[test]
    fn test_load_rejects_duplicate_ids() {
        let shape = filled_rect(0.0, 0.0);
        let snapshot = Snapshot::from_objects(vec![shape.clone(), shape.clone()]);
        let mut canvas = MemoryCanvas::new(10.0, 10.0);
        assert_eq!(
            canvas.load(&snapshot),
            Err(CanvasError::DuplicateObject(shape.id()))
        );
    }

    #[test]
    fn test_load_clears_background_image_and_selection() {
        let mut canvas = MemoryCanvas::new(10.0, 10.0);
        let id = canvas.add(filled_rect(0.0, 0.0));
        canvas.set_active_object(Some(id));
        canvas.set_background_image(Some(BackgroundImage {
            src: "bg.png".into(),
            width: 10,
            height: 10,
            scale: 1.0,
        }));
        canvas.load(&Snapshot::new()).unwrap();
        assert!(canvas.background_image().is_none());
        assert!(canvas.active_object().is_none());
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_background_image_is_not_serialized() {
        let mut canvas = MemoryCanvas::new(10.0, 10.0);
        canvas.set_background_image(Some(BackgroundImage {
            src: "bg.png".into(),
            width: 10,
            height: 10,
            scale: 1.0,
        }));
        assert_eq!(canvas.serialize(), Snapshot::new());
        assert!(canvas.objects_at(Point::new(5.0, 5.0)).is_empty());
    }

    #[test]
    fn test_objects_at_front_to_back() {
        let mut canvas = MemoryCanvas::new(600.0, 400.0);
        let back = canvas.add(filled_rect(0.0, 0.0));
        let front = canvas.add(filled_rect(50.0, 50.0));
        assert_eq!(canvas.objects_at(Point::new(75.0, 75.0)), vec![front, back]);
        assert_eq!(canvas.top_object_at(Point::new(10.0, 10.0)), Some(back));
    }

    #[test]
    fn test_drag_moves_active_object() {
        let mut canvas = MemoryCanvas::new(600.0, 400.0);
        let id = canvas.add(filled_rect(0.0, 0.0));

        let down = PointerEvent::Down {
            position: Point::new(50.0, 50.0),
            button: MouseButton::Left,
        };
        let outcome = canvas.handle_native(&down, Point::new(50.0, 50.0));
        assert_eq!(outcome.target, Some(id));
        assert_eq!(canvas.active_object(), Some(id));

        let mv = PointerEvent::Move {
            position: Point::new(60.0, 70.0),
        };
        canvas.handle_native(&mv, Point::new(60.0, 70.0));
        let up = PointerEvent::Up {
            position: Point::new(60.0, 70.0),
            button: MouseButton::Left,
        };
        canvas.handle_native(&up, Point::new(60.0, 70.0));

        let moved = canvas.get(id).unwrap().bounds();
        assert!((moved.x0 - 10.0).abs() < 1e-9);
        assert!((moved.y0 - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_interactive_objects_are_not_targeted() {
        let mut canvas = MemoryCanvas::new(600.0, 400.0);
        canvas.add(filled_rect(0.0, 0.0));
        canvas.set_objects_interactive(false);
        canvas.set_selection(false);
        let down = PointerEvent::Down {
            position: Point::new(50.0, 50.0),
            button: MouseButton::Left,
        };
        let outcome = canvas.handle_native(&down, Point::new(50.0, 50.0));
        assert_eq!(outcome.target, None);
        assert_eq!(canvas.active_object(), None);
    }

    #[test]
    fn test_brush_produces_stroke_on_up() {
        let mut canvas = MemoryCanvas::new(600.0, 400.0);
        canvas.set_brush(Some(Brush {
            width: 8.0,
            color: SerializableColor::black(),
        }));
        let pts = [(10.0, 10.0), (20.0, 15.0), (30.0, 30.0)];
        canvas.handle_native(
            &PointerEvent::Down {
                position: Point::new(pts[0].0, pts[0].1),
                button: MouseButton::Left,
            },
            Point::new(pts[0].0, pts[0].1),
        );
        canvas.handle_native(
            &PointerEvent::Move {
                position: Point::new(pts[1].0, pts[1].1),
            },
            Point::new(pts[1].0, pts[1].1),
        );
        let outcome = canvas.handle_native(
            &PointerEvent::Up {
                position: Point::new(pts[2].0, pts[2].1),
                button: MouseButton::Left,
            },
            Point::new(pts[2].0, pts[2].1),
        );
        let stroke = outcome.stroke.unwrap();
        assert_eq!(stroke.points.len(), 3);
        assert!((stroke.width - 8.0).abs() < f64::EPSILON);
        // The brush never adds objects by itself.
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_editing_only_accepts_text() {
        let mut canvas = MemoryCanvas::new(600.0, 400.0);
        let rect = canvas.add(filled_rect(0.0, 0.0));
        let text = canvas.add(Shape::Textbox(Text::new(Point::new(200.0, 200.0), "Luckiest Guy", 20.0)));
        canvas.set_editing_object(Some(rect));
        assert_eq!(canvas.editing_object(), None);
        canvas.set_editing_object(Some(text));
        assert_eq!(canvas.editing_object(), Some(text));
        canvas.remove(text);
        assert_eq!(canvas.editing_object(), None);
    }

    #[test]
    fn test_measure_text_scales_with_length() {
        let canvas = MemoryCanvas::new(10.0, 10.0);
        let short = canvas.measure_text("ab", "Luckiest Guy", 20.0);
        let long = canvas.measure_text("abcd", "Luckiest Guy", 20.0);
        assert!((long - 2.0 * short).abs() < 1e-9);
        assert_eq!(canvas.measure_text("", "serif", 20.0), 0.0);
    }
}
