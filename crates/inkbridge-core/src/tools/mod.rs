//! Drawing tools.
//!
//! Exactly one tool is bound at a time. Binding a tool means calling
//! [`Tool::configure`], which puts the canvas into the mode the tool needs
//! and subscribes the tool's handlers through a [`Registrar`]. Events then
//! reach the tool through [`Tool::handle`] with the handler that fired.

mod emoji;
mod eraser;
mod freedraw;
mod image;
mod point;
mod polygon;
mod registry;
mod shape;
mod text;
mod transform;

pub use emoji::EmojiTool;
pub use eraser::EraserTool;
pub use freedraw::FreedrawTool;
pub use image::ImageTool;
pub use point::PointTool;
pub use polygon::PolygonTool;
pub use registry::ToolRegistry;
pub use shape::{DragShape, MIN_EXTENT, ShapeTool};
pub use text::{MIN_TEXT_SIZE, TextTool};
pub use transform::TransformTool;

use crate::adapter::CanvasAdapter;
use crate::config::ToolParams;
use crate::input::{CanvasEvent, Key};
use crate::listeners::{Handler, Registrar};
use crate::services::{ImageSource, Rasterizer, Services};
use crate::shapes::Shape;
use crate::tasks::{Generation, Job, JobQueue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every tool the host can select through its drawing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Circle,
    Freedraw,
    Line,
    Polygon,
    Rect,
    Transform,
    Point,
    Text,
    Emoji,
    Image,
    Eraser,
}

impl ToolKind {
    pub const ALL: [ToolKind; 11] = [
        ToolKind::Circle,
        ToolKind::Freedraw,
        ToolKind::Line,
        ToolKind::Polygon,
        ToolKind::Rect,
        ToolKind::Transform,
        ToolKind::Point,
        ToolKind::Text,
        ToolKind::Emoji,
        ToolKind::Image,
        ToolKind::Eraser,
    ];

    /// The drawing-mode string the host uses for this tool.
    pub fn mode(self) -> &'static str {
        match self {
            ToolKind::Circle => "circle",
            ToolKind::Freedraw => "freedraw",
            ToolKind::Line => "line",
            ToolKind::Polygon => "polygon",
            ToolKind::Rect => "rect",
            ToolKind::Transform => "transform",
            ToolKind::Point => "point",
            ToolKind::Text => "text",
            ToolKind::Emoji => "emoji",
            ToolKind::Image => "image",
            ToolKind::Eraser => "eraser",
        }
    }

    pub fn from_mode(mode: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.mode() == mode)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mode())
    }
}

/// What a handler may touch while it runs.
pub struct ToolContext<'a> {
    pub canvas: &'a mut dyn CanvasAdapter,
    services: &'a Services,
    jobs: &'a mut JobQueue,
    generation: Generation,
}

impl<'a> ToolContext<'a> {
    pub fn new(
        canvas: &'a mut dyn CanvasAdapter,
        services: &'a Services,
        jobs: &'a mut JobQueue,
        generation: Generation,
    ) -> Self {
        Self {
            canvas,
            services,
            jobs,
            generation,
        }
    }

    /// Start loading an image; `job` says what to do with it once it arrives.
    pub fn load_image(&mut self, job: Job, source: ImageSource) {
        let future = self.services.loader.load(source);
        self.jobs.spawn(job, self.generation, future);
    }

    pub fn rasterizer(&self) -> &dyn Rasterizer {
        self.services.rasterizer.as_ref()
    }
}

pub trait Tool {
    fn kind(&self) -> ToolKind;

    /// Put the canvas into this tool's mode and subscribe its handlers.
    /// Must leave every listener it adds inside `listeners`.
    fn configure(&mut self, canvas: &mut dyn CanvasAdapter, params: &ToolParams, listeners: &mut Registrar<'_>);

    /// React to an event delivered to one of the handlers subscribed in `configure`.
    fn handle(&mut self, handler: Handler, event: &CanvasEvent, ctx: &mut ToolContext<'_>);
}

/// Any concrete tool.
pub enum AnyTool {
    Shape(ShapeTool),
    Polygon(PolygonTool),
    Point(PointTool),
    Freedraw(FreedrawTool),
    Eraser(EraserTool),
    Transform(TransformTool),
    Text(TextTool),
    Image(ImageTool),
    Emoji(EmojiTool),
}

impl AnyTool {
    fn as_tool(&self) -> &dyn Tool {
        match self {
            AnyTool::Shape(t) => t,
            AnyTool::Polygon(t) => t,
            AnyTool::Point(t) => t,
            AnyTool::Freedraw(t) => t,
            AnyTool::Eraser(t) => t,
            AnyTool::Transform(t) => t,
            AnyTool::Text(t) => t,
            AnyTool::Image(t) => t,
            AnyTool::Emoji(t) => t,
        }
    }

    fn as_tool_mut(&mut self) -> &mut dyn Tool {
        match self {
            AnyTool::Shape(t) => t,
            AnyTool::Polygon(t) => t,
            AnyTool::Point(t) => t,
            AnyTool::Freedraw(t) => t,
            AnyTool::Eraser(t) => t,
            AnyTool::Transform(t) => t,
            AnyTool::Text(t) => t,
            AnyTool::Image(t) => t,
            AnyTool::Emoji(t) => t,
        }
    }
}

impl Tool for AnyTool {
    fn kind(&self) -> ToolKind {
        self.as_tool().kind()
    }

    fn configure(&mut self, canvas: &mut dyn CanvasAdapter, params: &ToolParams, listeners: &mut Registrar<'_>) {
        self.as_tool_mut().configure(canvas, params, listeners);
    }

    fn handle(&mut self, handler: Handler, event: &CanvasEvent, ctx: &mut ToolContext<'_>) {
        self.as_tool_mut().handle(handler, event, ctx);
    }
}

/// Plain canvas: no brush, no selection, objects ignore the pointer.
pub(crate) fn inert_canvas(canvas: &mut dyn CanvasAdapter) {
    canvas.set_brush(None);
    canvas.set_selection(false);
    canvas.set_objects_interactive(false);
}

/// Delete removes the active object when it matches `accepts`.
pub(crate) fn delete_active(canvas: &mut dyn CanvasAdapter, key: &Key, accepts: fn(&Shape) -> bool) -> bool {
    if *key != Key::Delete {
        return false;
    }
    let Some(id) = canvas.active_object() else {
        return false;
    };
    if !canvas.get(id).is_some_and(accepts) {
        return false;
    }
    canvas.remove(id).is_some()
}

/// Arrow keys nudge the active object when it matches `accepts`.
pub(crate) fn nudge_active(canvas: &mut dyn CanvasAdapter, key: &Key, accepts: fn(&Shape) -> bool) -> bool {
    let Some(offset) = key.arrow_offset() else {
        return false;
    };
    let Some(id) = canvas.active_object() else {
        return false;
    };
    match canvas.get_mut(id) {
        Some(shape) if accepts(shape) => {
            shape.translate(offset);
            true
        }
        _ => false,
    }
}
