//! The seam between the engine and a concrete drawing surface.
//!
//! Tools and the orchestrator only ever talk to a [`CanvasAdapter`]. The
//! adapter owns the live objects, the viewport, the free-drawing brush and
//! the built-in selection behavior (clicking selects, dragging moves).

use crate::input::{PointerEvent, Stroke};
use crate::shapes::{SerializableColor, Shape, ShapeId};
use crate::snapshot::Snapshot;
use kurbo::{Point, Size};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanvasError {
    #[error("snapshot contains object {0} more than once")]
    DuplicateObject(ShapeId),
}

/// Free-drawing brush settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub width: f64,
    pub color: SerializableColor,
}

/// A decorative image drawn behind all objects. It is neither serialized
/// nor hit-tested, and loading a snapshot removes it.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundImage {
    pub src: String,
    pub width: u32,
    pub height: u32,
    pub scale: f64,
}

/// What the surface's built-in behavior made of a pointer event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeOutcome {
    /// Interactive object under the pointer.
    pub target: Option<ShapeId>,
    /// A brush stroke that was completed by this event.
    pub stroke: Option<Stroke>,
}

pub trait CanvasAdapter {
    /// Replace all content with the snapshot. Clears selection, editing
    /// state and the background image.
    fn load(&mut self, snapshot: &Snapshot) -> Result<(), CanvasError>;

    /// Capture all objects, back to front.
    fn serialize(&self) -> Snapshot;

    fn size(&self) -> Size;

    /// Change the surface dimensions. Content is not touched.
    fn resize(&mut self, width: f64, height: f64);

    fn add(&mut self, shape: Shape) -> ShapeId;

    fn remove(&mut self, id: ShapeId) -> Option<Shape>;

    fn get(&self, id: ShapeId) -> Option<&Shape>;

    fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape>;

    /// Object ids, back to front.
    fn object_ids(&self) -> Vec<ShapeId>;

    /// Objects under a canvas point, front to back.
    fn objects_at(&self, point: Point) -> Vec<ShapeId>;

    fn active_object(&self) -> Option<ShapeId>;

    fn set_active_object(&mut self, id: Option<ShapeId>);

    /// Text object currently in edit mode.
    fn editing_object(&self) -> Option<ShapeId>;

    fn set_editing_object(&mut self, id: Option<ShapeId>);

    /// Enable or disable the built-in selection behavior.
    fn set_selection(&mut self, enabled: bool);

    /// Whether objects react to the pointer (can be targeted and dragged).
    fn set_objects_interactive(&mut self, interactive: bool);

    /// `Some` enables free drawing with the brush, `None` disables it.
    fn set_brush(&mut self, brush: Option<Brush>);

    /// Run the built-in behavior for a pointer event at a canvas point.
    fn handle_native(&mut self, event: &PointerEvent, point: Point) -> NativeOutcome;

    /// Rendered width of one line of text.
    fn measure_text(&self, line: &str, font_family: &str, font_size: f64) -> f64;

    fn to_canvas_point(&self, screen: Point) -> Point;

    fn zoom(&self) -> f64;

    /// Set an absolute zoom level anchored at a screen point.
    fn zoom_to_point(&mut self, screen: Point, zoom: f64);

    /// Identity viewport.
    fn reset_viewport(&mut self);

    fn set_background_image(&mut self, image: Option<BackgroundImage>);

    fn background_image(&self) -> Option<&BackgroundImage>;

    fn len(&self) -> usize {
        self.object_ids().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Topmost object under a canvas point.
    fn top_object_at(&self, point: Point) -> Option<ShapeId> {
        self.objects_at(point).into_iter().next()
    }
}
