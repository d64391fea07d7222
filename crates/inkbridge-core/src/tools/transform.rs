//! Selection mode: objects can be picked and dragged, double click deletes.

use super::{Tool, ToolContext, ToolKind};
use crate::adapter::CanvasAdapter;
use crate::config::ToolParams;
use crate::input::CanvasEvent;
use crate::listeners::{Channel, Handler, Registrar};

#[derive(Default)]
pub struct TransformTool;

impl TransformTool {
    pub fn new() -> Self {
        Self
    }
}

impl Tool for TransformTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Transform
    }

    fn configure(&mut self, canvas: &mut dyn CanvasAdapter, _params: &ToolParams, listeners: &mut Registrar<'_>) {
        canvas.set_brush(None);
        canvas.set_selection(true);
        canvas.set_objects_interactive(true);
        listeners.on(Channel::DoubleClick, Handler::DoubleClick);
    }

    fn handle(&mut self, handler: Handler, event: &CanvasEvent, ctx: &mut ToolContext<'_>) {
        if handler != Handler::DoubleClick {
            return;
        }
        if let Some(target) = event.pointer().and_then(|info| info.target) {
            ctx.canvas.remove(target);
        }
    }
}
