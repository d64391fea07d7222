//! Click-by-click polygon construction.
//!
//! Left clicks place vertices while an open preview follows the pointer.
//! A right click closes the polygon, a double click takes back the latest
//! vertex.

use super::{Tool, ToolContext, ToolKind, inert_canvas};
use crate::adapter::CanvasAdapter;
use crate::config::ToolParams;
use crate::input::{CanvasEvent, MouseButton};
use crate::listeners::{Channel, Handler, Registrar};
use crate::shapes::{Polygon, Shape, ShapeId, ShapeStyle};
use kurbo::Point;

/// Fewest vertices a finished polygon may have.
pub const MIN_VERTICES: usize = 3;

/// Clicks this close to the double-click position belong to it.
const SAME_SPOT: f64 = 1.0;

enum PolygonState {
    Idle,
    Building {
        preview: ShapeId,
        vertices: Vec<Point>,
        cursor: Point,
    },
}

pub struct PolygonTool {
    style: ShapeStyle,
    state: PolygonState,
}

impl Default for PolygonTool {
    fn default() -> Self {
        Self::new()
    }
}

impl PolygonTool {
    pub fn new() -> Self {
        Self {
            style: ShapeStyle::default(),
            state: PolygonState::Idle,
        }
    }

    pub fn vertex_count(&self) -> usize {
        match &self.state {
            PolygonState::Idle => 0,
            PolygonState::Building { vertices, .. } => vertices.len(),
        }
    }

    fn preview_style(&self) -> ShapeStyle {
        ShapeStyle {
            fill_color: None,
            ..self.style.clone()
        }
    }

    fn sync_preview(&self, canvas: &mut dyn CanvasAdapter) {
        let PolygonState::Building {
            preview,
            vertices,
            cursor,
        } = &self.state
        else {
            return;
        };
        if let Some(Shape::Polygon(poly)) = canvas.get_mut(*preview) {
            poly.points = vertices.clone();
            poly.points.push(*cursor);
        }
    }

    fn place_vertex(&mut self, point: Point, canvas: &mut dyn CanvasAdapter) {
        match &mut self.state {
            PolygonState::Idle => {
                let shape = Polygon::open(vec![point, point]).with_style(self.preview_style());
                let preview = canvas.add(Shape::Polygon(shape));
                self.state = PolygonState::Building {
                    preview,
                    vertices: vec![point],
                    cursor: point,
                };
            }
            PolygonState::Building {
                vertices, cursor, ..
            } => {
                vertices.push(point);
                *cursor = point;
                self.sync_preview(canvas);
            }
        }
    }

    fn close(&mut self, canvas: &mut dyn CanvasAdapter) {
        let PolygonState::Building {
            preview, vertices, ..
        } = std::mem::replace(&mut self.state, PolygonState::Idle)
        else {
            return;
        };
        if vertices.len() < MIN_VERTICES {
            log::debug!("polygon with {} vertices discarded", vertices.len());
            canvas.remove(preview);
            return;
        }
        if let Some(Shape::Polygon(poly)) = canvas.get_mut(preview) {
            poly.points = vertices;
            poly.closed = true;
            poly.style = self.style.clone();
        }
    }

    fn take_back(&mut self, at: Point, canvas: &mut dyn CanvasAdapter) {
        let PolygonState::Building {
            preview, vertices, ..
        } = &mut self.state
        else {
            return;
        };
        // The double click's own clicks placed vertices on the spot; drop those first.
        while vertices
            .last()
            .is_some_and(|last| (*last - at).hypot() <= SAME_SPOT)
        {
            vertices.pop();
        }
        vertices.pop();
        if vertices.is_empty() {
            canvas.remove(*preview);
            self.state = PolygonState::Idle;
        } else {
            self.sync_preview(canvas);
        }
    }
}

impl Tool for PolygonTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Polygon
    }

    fn configure(&mut self, canvas: &mut dyn CanvasAdapter, params: &ToolParams, listeners: &mut Registrar<'_>) {
        inert_canvas(canvas);
        self.style = ShapeStyle::new(params.stroke_color, params.stroke_width).with_fill(params.fill_color);
        self.state = PolygonState::Idle;

        listeners.on(Channel::PointerDown, Handler::PointerDown);
        listeners.on(Channel::PointerMove, Handler::PointerMove);
        listeners.on(Channel::DoubleClick, Handler::DoubleClick);
    }

    fn handle(&mut self, handler: Handler, event: &CanvasEvent, ctx: &mut ToolContext<'_>) {
        let Some(info) = event.pointer() else {
            return;
        };
        match handler {
            Handler::PointerDown => match info.button {
                Some(MouseButton::Left) => self.place_vertex(info.point, ctx.canvas),
                Some(MouseButton::Right) => self.close(ctx.canvas),
                _ => {}
            },
            Handler::PointerMove => {
                if let PolygonState::Building { cursor, .. } = &mut self.state {
                    *cursor = info.point;
                    self.sync_preview(ctx.canvas);
                }
            }
            Handler::DoubleClick => self.take_back(info.point, ctx.canvas),
            _ => {}
        }
    }
}
