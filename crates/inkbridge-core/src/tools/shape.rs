//! Press-drag-release tools: rectangle, circle and line.

use super::{Tool, ToolContext, ToolKind, inert_canvas};
use crate::adapter::CanvasAdapter;
use crate::config::ToolParams;
use crate::input::{CanvasEvent, MouseButton};
use crate::listeners::{Channel, Handler, Registrar};
use crate::shapes::{Ellipse, Line, Rectangle, Shape, ShapeId, ShapeStyle};
use kurbo::Point;

/// Shapes smaller than this on release are discarded.
pub const MIN_EXTENT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragShape {
    Rect,
    Circle,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Dragging { anchor: Point, id: ShapeId },
}

pub struct ShapeTool {
    shape: DragShape,
    style: ShapeStyle,
    corner_radius: f64,
    state: DragState,
}

impl ShapeTool {
    pub fn new(shape: DragShape) -> Self {
        Self {
            shape,
            style: ShapeStyle::default(),
            corner_radius: 0.0,
            state: DragState::Idle,
        }
    }

    pub fn rect() -> Self {
        Self::new(DragShape::Rect)
    }

    pub fn circle() -> Self {
        Self::new(DragShape::Circle)
    }

    pub fn line() -> Self {
        Self::new(DragShape::Line)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    fn build(&self, anchor: Point) -> Shape {
        match self.shape {
            DragShape::Rect => {
                let mut rect = Rectangle::new(anchor, 0.0, 0.0).with_style(self.style.clone());
                rect.corner_radius = self.corner_radius;
                Shape::Rect(rect)
            }
            DragShape::Circle => {
                Shape::Circle(Ellipse::circle(anchor, 0.0).with_style(self.style.clone()))
            }
            DragShape::Line => {
                let style = ShapeStyle {
                    fill_color: None,
                    ..self.style.clone()
                };
                Shape::Line(Line::new(anchor, anchor).with_style(style))
            }
        }
    }

    /// Stretch the provisional shape between the anchor and the pointer.
    fn reshape(shape: &mut Shape, anchor: Point, pointer: Point) {
        match shape {
            Shape::Rect(rect) => rect.set_corners(anchor, pointer),
            Shape::Circle(circle) => {
                let radius = (pointer - anchor).hypot() / 2.0;
                circle.center = anchor.midpoint(pointer);
                circle.radius_x = radius;
                circle.radius_y = radius;
            }
            Shape::Line(line) => line.end = pointer,
            _ => {}
        }
    }

    fn is_degenerate(shape: &Shape) -> bool {
        match shape {
            Shape::Rect(rect) => rect.width < MIN_EXTENT && rect.height < MIN_EXTENT,
            Shape::Circle(circle) => circle.radius_x * 2.0 < MIN_EXTENT,
            Shape::Line(line) => line.length() < MIN_EXTENT,
            _ => false,
        }
    }
}

impl Tool for ShapeTool {
    fn kind(&self) -> ToolKind {
        match self.shape {
            DragShape::Rect => ToolKind::Rect,
            DragShape::Circle => ToolKind::Circle,
            DragShape::Line => ToolKind::Line,
        }
    }

    fn configure(&mut self, canvas: &mut dyn CanvasAdapter, params: &ToolParams, listeners: &mut Registrar<'_>) {
        inert_canvas(canvas);
        self.style = ShapeStyle::new(params.stroke_color, params.stroke_width).with_fill(params.fill_color);
        self.corner_radius = params.corner_radius;
        self.state = DragState::Idle;

        listeners.on(Channel::PointerDown, Handler::PointerDown);
        listeners.on(Channel::PointerMove, Handler::PointerMove);
        listeners.on(Channel::PointerUp, Handler::PointerUp);
        listeners.on(Channel::PointerOut, Handler::PointerOut);
    }

    fn handle(&mut self, handler: Handler, event: &CanvasEvent, ctx: &mut ToolContext<'_>) {
        let Some(info) = event.pointer() else {
            return;
        };
        match (handler, self.state) {
            (Handler::PointerDown, _) if info.button == Some(MouseButton::Left) => {
                let id = ctx.canvas.add(self.build(info.point));
                self.state = DragState::Dragging {
                    anchor: info.point,
                    id,
                };
            }
            (Handler::PointerMove, DragState::Dragging { anchor, id }) => {
                if let Some(shape) = ctx.canvas.get_mut(id) {
                    Self::reshape(shape, anchor, info.point);
                }
            }
            (Handler::PointerUp | Handler::PointerOut, DragState::Dragging { id, .. }) => {
                self.state = DragState::Idle;
                if ctx.canvas.get(id).is_some_and(Self::is_degenerate) {
                    log::trace!("discarding degenerate {} shape", self.kind());
                    ctx.canvas.remove(id);
                }
            }
            _ => {}
        }
    }
}
