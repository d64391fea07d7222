//! Places user-picked images and lets them be moved with the keyboard.

use super::{Tool, ToolContext, ToolKind, delete_active, nudge_active};
use crate::adapter::CanvasAdapter;
use crate::config::ToolParams;
use crate::input::{CanvasEvent, MouseButton};
use crate::listeners::{Channel, Handler, Registrar};
use crate::services::ImageSource;
use crate::shapes::Shape;
use crate::tasks::Job;

#[derive(Default)]
pub struct ImageTool;

impl ImageTool {
    pub fn new() -> Self {
        Self
    }
}

impl Tool for ImageTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Image
    }

    fn configure(&mut self, canvas: &mut dyn CanvasAdapter, _params: &ToolParams, listeners: &mut Registrar<'_>) {
        canvas.set_brush(None);
        canvas.set_selection(false);
        canvas.set_objects_interactive(true);
        listeners.on(Channel::PointerDown, Handler::PointerDown);
        listeners.on(Channel::KeyDown, Handler::DeleteKey);
        listeners.on(Channel::KeyDown, Handler::ArrowKeys);
    }

    fn handle(&mut self, handler: Handler, event: &CanvasEvent, ctx: &mut ToolContext<'_>) {
        match (handler, event) {
            (Handler::PointerDown, CanvasEvent::Pointer(info)) => {
                // Clicking an existing object selects it instead of inserting.
                if info.button == Some(MouseButton::Left) && info.target.is_none() {
                    ctx.load_image(Job::InsertImage { at: info.point }, ImageSource::UserFile);
                }
            }
            (Handler::DeleteKey, CanvasEvent::Key(key)) => {
                delete_active(ctx.canvas, key, Shape::is_image);
            }
            (Handler::ArrowKeys, CanvasEvent::Key(key)) => {
                nudge_active(ctx.canvas, key, Shape::is_image);
            }
            _ => {}
        }
    }
}
