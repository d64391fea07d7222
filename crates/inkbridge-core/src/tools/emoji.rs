//! Stamps the configured glyph on click.

use super::{Tool, ToolContext, ToolKind, inert_canvas};
use crate::adapter::CanvasAdapter;
use crate::config::ToolParams;
use crate::input::{CanvasEvent, MouseButton};
use crate::listeners::{Channel, Handler, Registrar};
use crate::shapes::{Glyph, Shape};

pub struct EmojiTool {
    glyph: String,
    size: f64,
}

impl Default for EmojiTool {
    fn default() -> Self {
        Self::new()
    }
}

impl EmojiTool {
    pub fn new() -> Self {
        Self {
            glyph: String::new(),
            size: 0.0,
        }
    }
}

impl Tool for EmojiTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Emoji
    }

    fn configure(&mut self, canvas: &mut dyn CanvasAdapter, params: &ToolParams, listeners: &mut Registrar<'_>) {
        inert_canvas(canvas);
        self.glyph = params.glyph.clone();
        self.size = params.glyph_size;
        listeners.on(Channel::PointerDown, Handler::PointerDown);
    }

    fn handle(&mut self, handler: Handler, event: &CanvasEvent, ctx: &mut ToolContext<'_>) {
        let Some(info) = event.pointer() else {
            return;
        };
        if handler != Handler::PointerDown || info.button != Some(MouseButton::Left) {
            return;
        }
        if self.glyph.is_empty() {
            log::debug!("no glyph configured, nothing stamped");
            return;
        }
        ctx.canvas
            .add(Shape::Glyph(Glyph::new(info.point, self.glyph.clone(), self.size)));
    }
}
