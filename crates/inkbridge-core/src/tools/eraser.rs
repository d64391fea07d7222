//! Raster eraser.
//!
//! The eraser paints with the brush like free drawing, but the finished
//! stroke is cut out of every object it touches. Those objects are flattened
//! into a single image with the stroke removed, which replaces them once the
//! image has been loaded back. Objects the rasterizer cannot paint are left
//! alone.

use super::{Tool, ToolContext, ToolKind};
use crate::adapter::{Brush, CanvasAdapter};
use crate::config::ToolParams;
use crate::input::{CanvasEvent, Stroke};
use crate::listeners::{Channel, Handler, Registrar};
use crate::services::{CutoutRequest, ImageSource};
use crate::shapes::{SerializableColor, Shape};
use crate::tasks::Job;
use kurbo::Rect;

#[derive(Default)]
pub struct EraserTool;

impl EraserTool {
    pub fn new() -> Self {
        Self
    }

    fn erase(&self, stroke: &Stroke, ctx: &mut ToolContext<'_>) {
        let touched: Vec<Shape> = ctx
            .canvas
            .object_ids()
            .into_iter()
            .filter_map(|id| ctx.canvas.get(id))
            .filter(|shape| shape.touched_by_stroke(&stroke.points, stroke.width))
            .filter(|shape| {
                let paintable = ctx.rasterizer().can_paint(shape);
                if !paintable {
                    log::debug!("eraser skips {} {}", shape.kind_name(), shape.id());
                }
                paintable
            })
            .cloned()
            .collect();
        if touched.is_empty() {
            log::trace!("eraser stroke touched nothing");
            return;
        }

        let bounds = touched
            .iter()
            .map(Shape::painted_bounds)
            .reduce(|acc, r| acc.union(r))
            .unwrap_or(Rect::ZERO);
        let request = CutoutRequest {
            objects: &touched,
            eraser: stroke,
            bounds,
        };
        match ctx.rasterizer().rasterize_cutout(&request) {
            Ok(raster) => {
                log::debug!(
                    "erasing {} objects into a {}x{} cutout",
                    touched.len(),
                    raster.width,
                    raster.height
                );
                let job = Job::EraseCutout {
                    replaced: touched.iter().map(Shape::id).collect(),
                    origin: bounds.origin(),
                };
                ctx.load_image(job, ImageSource::DataUrl(raster.to_data_url()));
            }
            Err(e) => log::warn!("eraser cutout failed: {e}"),
        }
    }
}

impl Tool for EraserTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Eraser
    }

    fn configure(&mut self, canvas: &mut dyn CanvasAdapter, params: &ToolParams, listeners: &mut Registrar<'_>) {
        canvas.set_selection(false);
        canvas.set_objects_interactive(false);
        canvas.set_brush(Some(Brush {
            width: params.stroke_width,
            color: SerializableColor::white(),
        }));
        listeners.on(Channel::PathCreated, Handler::PathCreated);
    }

    fn handle(&mut self, handler: Handler, event: &CanvasEvent, ctx: &mut ToolContext<'_>) {
        if let (Handler::PathCreated, CanvasEvent::PathCreated(stroke)) = (handler, event) {
            self.erase(stroke, ctx);
        }
    }
}
