//! Text boxes: drag to place, type to fill, double click to edit again.
//!
//! The box being typed into is the canvas' editing object. Its width always
//! follows its longest line and blank boxes are dropped once the user moves
//! on.

use super::{Tool, ToolContext, ToolKind, delete_active, nudge_active};
use crate::adapter::CanvasAdapter;
use crate::config::ToolParams;
use crate::input::{CanvasEvent, Key, MouseButton, PointerInfo};
use crate::listeners::{Channel, Handler, Registrar};
use crate::shapes::{LINE_HEIGHT, Shape, ShapeId, ShapeStyle, Text};
use kurbo::Point;

/// Smallest width and height of a text box.
pub const MIN_TEXT_SIZE: f64 = 10.0;

const DEFAULT_FONT_SIZE: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum TextState {
    Idle,
    /// A new box is being dragged open.
    Placing { anchor: Point, id: ShapeId },
    /// The pointer went down on an existing box; the canvas moves it.
    Adjusting,
}

pub struct TextTool {
    state: TextState,
    current: Option<ShapeId>,
    style: ShapeStyle,
    font_family: String,
    font_size: f64,
}

impl Default for TextTool {
    fn default() -> Self {
        Self::new()
    }
}

impl TextTool {
    pub fn new() -> Self {
        Self {
            state: TextState::Idle,
            current: None,
            style: ShapeStyle::default(),
            font_family: String::new(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }

    /// Text box under a canvas point, ignoring other objects stacked above it.
    fn textbox_at(canvas: &dyn CanvasAdapter, point: Point) -> Option<ShapeId> {
        canvas
            .objects_at(point)
            .into_iter()
            .find(|id| canvas.get(*id).is_some_and(Shape::is_text))
    }

    fn is_textbox(canvas: &dyn CanvasAdapter, id: Option<ShapeId>) -> bool {
        id.and_then(|id| canvas.get(id)).is_some_and(Shape::is_text)
    }

    /// Size the box to its content.
    fn fit(canvas: &mut dyn CanvasAdapter, id: ShapeId) {
        let Some(text) = canvas.get(id).and_then(Shape::as_text) else {
            return;
        };
        let width = text
            .lines()
            .map(|line| canvas.measure_text(line, &text.font_family, text.font_size))
            .fold(MIN_TEXT_SIZE, f64::max);
        let height = (text.line_count() as f64 * text.font_size * LINE_HEIGHT).max(MIN_TEXT_SIZE);
        if let Some(text) = canvas.get_mut(id).and_then(Shape::as_text_mut) {
            text.width = width;
            text.height = height;
        }
    }

    /// Drop the tracked box if nothing was typed into it.
    fn discard_if_blank(&mut self, canvas: &mut dyn CanvasAdapter) {
        let Some(id) = self.current.take() else {
            return;
        };
        if canvas.get(id).and_then(Shape::as_text).is_some_and(Text::is_blank) {
            log::trace!("removing blank text box {id}");
            canvas.remove(id);
        }
    }

    fn pointer_down(&mut self, info: &PointerInfo, canvas: &mut dyn CanvasAdapter) {
        if Self::is_textbox(canvas, canvas.active_object()) {
            self.state = TextState::Adjusting;
            return;
        }
        self.discard_if_blank(canvas);

        if let Some(id) = Self::textbox_at(canvas, info.point) {
            canvas.set_active_object(Some(id));
            self.current = Some(id);
            self.state = TextState::Adjusting;
            return;
        }

        let mut text = Text::new(info.point, self.font_family.clone(), self.font_size)
            .with_style(self.style.clone());
        text.width = MIN_TEXT_SIZE;
        text.height = MIN_TEXT_SIZE;
        let id = canvas.add(Shape::Textbox(text));
        canvas.set_active_object(Some(id));
        canvas.set_editing_object(Some(id));
        self.current = Some(id);
        self.state = TextState::Placing {
            anchor: info.point,
            id,
        };
    }

    fn pointer_move(&mut self, info: &PointerInfo, canvas: &mut dyn CanvasAdapter) {
        let TextState::Placing { anchor, id } = self.state else {
            return;
        };
        if let Some(text) = canvas.get_mut(id).and_then(Shape::as_text_mut) {
            text.width = (info.point.x - anchor.x).abs().max(MIN_TEXT_SIZE);
            text.height = (info.point.y - anchor.y).abs().max(MIN_TEXT_SIZE);
        }
    }

    fn double_click(&mut self, info: &PointerInfo, canvas: &mut dyn CanvasAdapter) {
        let Some(id) = Self::textbox_at(canvas, info.point) else {
            return;
        };
        canvas.set_active_object(Some(id));
        canvas.set_editing_object(Some(id));
        self.current = Some(id);
        Self::fit(canvas, id);
    }

    fn edit(&mut self, key: &Key, canvas: &mut dyn CanvasAdapter) {
        let Some(id) = canvas.editing_object() else {
            return;
        };
        if *key == Key::Escape {
            canvas.set_editing_object(None);
            self.current = Some(id);
            self.discard_if_blank(canvas);
            return;
        }
        let Some(text) = canvas.get_mut(id).and_then(Shape::as_text_mut) else {
            return;
        };
        match key {
            Key::Character(c) => text.content.push(*c),
            Key::Enter => text.content.push('\n'),
            Key::Backspace => {
                text.content.pop();
            }
            _ => return,
        }
        Self::fit(canvas, id);
    }
}

impl Tool for TextTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Text
    }

    fn configure(&mut self, canvas: &mut dyn CanvasAdapter, params: &ToolParams, listeners: &mut Registrar<'_>) {
        canvas.set_brush(None);
        canvas.set_selection(true);
        canvas.set_objects_interactive(true);

        self.style = ShapeStyle::new(params.stroke_color, params.stroke_width);
        self.font_family = params.font_family.clone();
        self.font_size = if params.font_size > 0.0 {
            params.font_size
        } else {
            DEFAULT_FONT_SIZE
        };
        self.state = TextState::Idle;

        // A box still being typed into picks up the new style.
        if let Some(id) = canvas.editing_object() {
            if let Some(text) = canvas.get_mut(id).and_then(Shape::as_text_mut) {
                text.style = self.style.clone();
                text.font_family = self.font_family.clone();
                text.font_size = self.font_size;
                self.current = Some(id);
                Self::fit(canvas, id);
            }
        }

        listeners.on(Channel::PointerDown, Handler::PointerDown);
        listeners.on(Channel::PointerMove, Handler::PointerMove);
        listeners.on(Channel::PointerUp, Handler::PointerUp);
        listeners.on(Channel::PointerOut, Handler::PointerOut);
        listeners.on(Channel::DoubleClick, Handler::DoubleClick);
        listeners.on(Channel::KeyDown, Handler::DeleteKey);
        listeners.on(Channel::KeyDown, Handler::ArrowKeys);
        listeners.on(Channel::KeyDown, Handler::TextEdit);
    }

    fn handle(&mut self, handler: Handler, event: &CanvasEvent, ctx: &mut ToolContext<'_>) {
        match (handler, event) {
            (Handler::PointerDown, CanvasEvent::Pointer(info)) => {
                if info.button == Some(MouseButton::Left) {
                    self.pointer_down(info, ctx.canvas);
                }
            }
            (Handler::PointerMove, CanvasEvent::Pointer(info)) => self.pointer_move(info, ctx.canvas),
            (Handler::PointerUp | Handler::PointerOut, CanvasEvent::Pointer(_)) => {
                self.state = TextState::Idle;
            }
            (Handler::DoubleClick, CanvasEvent::Pointer(info)) => self.double_click(info, ctx.canvas),
            // Keys belong to the text while a box is being edited.
            (Handler::DeleteKey, CanvasEvent::Key(key)) if ctx.canvas.editing_object().is_none() => {
                delete_active(ctx.canvas, key, Shape::is_text);
            }
            (Handler::ArrowKeys, CanvasEvent::Key(key)) if ctx.canvas.editing_object().is_none() => {
                nudge_active(ctx.canvas, key, Shape::is_text);
            }
            (Handler::TextEdit, CanvasEvent::Key(key)) => self.edit(key, ctx.canvas),
            _ => {}
        }
    }
}
