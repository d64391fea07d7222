//! Free drawing with the canvas brush.

use super::{Tool, ToolContext, ToolKind};
use crate::adapter::{Brush, CanvasAdapter};
use crate::config::ToolParams;
use crate::input::CanvasEvent;
use crate::listeners::{Channel, Handler, Registrar};
use crate::shapes::{Freehand, Shape, ShapeStyle};

#[derive(Default)]
pub struct FreedrawTool;

impl FreedrawTool {
    pub fn new() -> Self {
        Self
    }
}

impl Tool for FreedrawTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Freedraw
    }

    fn configure(&mut self, canvas: &mut dyn CanvasAdapter, params: &ToolParams, listeners: &mut Registrar<'_>) {
        canvas.set_selection(false);
        canvas.set_objects_interactive(false);
        canvas.set_brush(Some(Brush {
            width: params.stroke_width,
            color: params.stroke_color,
        }));
        listeners.on(Channel::PathCreated, Handler::PathCreated);
    }

    fn handle(&mut self, handler: Handler, event: &CanvasEvent, ctx: &mut ToolContext<'_>) {
        if let (Handler::PathCreated, CanvasEvent::PathCreated(stroke)) = (handler, event) {
            let path = Freehand::from_points(stroke.points.clone())
                .with_style(ShapeStyle::new(stroke.color, stroke.width));
            ctx.canvas.add(Shape::Path(path));
        }
    }
}
