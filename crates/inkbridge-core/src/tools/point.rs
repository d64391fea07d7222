//! Stamps a small circle where the pointer goes down.

use super::{Tool, ToolContext, ToolKind, inert_canvas};
use crate::adapter::CanvasAdapter;
use crate::config::ToolParams;
use crate::input::{CanvasEvent, MouseButton};
use crate::listeners::{Channel, Handler, Registrar};
use crate::shapes::{Ellipse, Shape, ShapeStyle};

pub struct PointTool {
    style: ShapeStyle,
    radius: f64,
}

impl Default for PointTool {
    fn default() -> Self {
        Self::new()
    }
}

impl PointTool {
    pub fn new() -> Self {
        Self {
            style: ShapeStyle::default(),
            radius: 3.0,
        }
    }
}

impl Tool for PointTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Point
    }

    fn configure(&mut self, canvas: &mut dyn CanvasAdapter, params: &ToolParams, listeners: &mut Registrar<'_>) {
        inert_canvas(canvas);
        self.style = ShapeStyle::new(params.stroke_color, params.stroke_width).with_fill(params.fill_color);
        self.radius = params.display_radius;
        listeners.on(Channel::PointerDown, Handler::PointerDown);
    }

    fn handle(&mut self, handler: Handler, event: &CanvasEvent, ctx: &mut ToolContext<'_>) {
        let Some(info) = event.pointer() else {
            return;
        };
        if handler == Handler::PointerDown && info.button == Some(MouseButton::Left) {
            let dot = Ellipse::circle(info.point, self.radius).with_style(self.style.clone());
            ctx.canvas.add(Shape::Circle(dot));
        }
    }
}
