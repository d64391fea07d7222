//! Composition root: host parameters, the bound tool, history and host sync.
//!
//! The orchestrator owns the canvas and is the only place that binds tools.
//! Every rebinding releases the previous tool's listeners before the next
//! tool is configured, within a single call. Commit listeners belong to the
//! session and are rebound together with the tool so they always fire after
//! the tool's own handlers.

use crate::adapter::{BackgroundImage, CanvasAdapter};
use crate::canvas::MemoryCanvas;
use crate::config::{ConfigError, HostParams, ToolParams};
use crate::history::{CommitKind, History, PushOutcome};
use crate::input::{CanvasEvent, Key, MouseButton, PointerEvent, PointerInfo};
use crate::listeners::{Channel, EventBus, Handler, Listener, Owner, Registrar, Teardown};
use crate::services::{ImageSource, LoadError, LoadedImage, Services};
use crate::shapes::{Image, Shape};
use crate::snapshot::Snapshot;
use crate::sync::{HostSyncBridge, HostUpdate};
use crate::tasks::{Completion, Generation, Job, JobQueue};
use crate::tools::{AnyTool, Tool, ToolContext, ToolKind, ToolRegistry};
use crate::viewport::zoom_after_wheel;
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// The bound tool and the listeners that came with it.
struct Binding {
    tool: AnyTool,
    teardown: Teardown,
    session: Teardown,
}

/// Listeners that ran for one input event, in firing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    pub fired: Vec<Listener>,
}

impl DispatchReport {
    pub fn len(&self) -> usize {
        self.fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }

    /// How many fired listeners belong to `owner`.
    pub fn fired_by(&self, owner: Owner) -> usize {
        self.fired.iter().filter(|l| l.owner == owner).count()
    }

    pub fn fired_handler(&self, handler: Handler) -> usize {
        self.fired.iter().filter(|l| l.handler == handler).count()
    }
}

pub struct Orchestrator<C: CanvasAdapter = MemoryCanvas> {
    canvas: C,
    params: HostParams,
    tool_params: ToolParams,
    registry: ToolRegistry,
    bus: EventBus,
    binding: Option<Binding>,
    history: History,
    bridge: HostSyncBridge,
    services: Services,
    jobs: JobQueue,
    /// Tags async edits; advances whenever the document is replaced.
    edit_generation: Generation,
    /// Tags background loads; advances on every (re)application.
    background_generation: Generation,
    background_cache: Option<(String, LoadedImage)>,
}

impl<C: CanvasAdapter> Orchestrator<C> {
    /// Mount the canvas: load the initial drawing, bind the drawing mode and
    /// start applying the background.
    pub fn new(canvas: C, services: Services, params: HostParams) -> Result<Self, ConfigError> {
        Self::with_registry(canvas, services, params, ToolRegistry::default())
    }

    pub fn with_registry(
        mut canvas: C,
        services: Services,
        params: HostParams,
        registry: ToolRegistry,
    ) -> Result<Self, ConfigError> {
        params.validate_dimensions()?;
        let tool_params = params.tool_params()?;
        let initial = params.initial_snapshot()?;

        canvas.resize(f64::from(params.canvas_width), f64::from(params.canvas_height));
        canvas
            .load(&initial)
            .map_err(|e| ConfigError::InvalidDrawing(e.to_string()))?;

        let mode = params.drawing_mode.clone();
        let mut orchestrator = Self {
            canvas,
            params,
            tool_params,
            registry,
            bus: EventBus::new(),
            binding: None,
            history: History::new(initial),
            bridge: HostSyncBridge::new(),
            services,
            jobs: JobQueue::new(),
            edit_generation: Generation::default(),
            background_generation: Generation::default(),
            background_cache: None,
        };
        orchestrator.apply_background();
        orchestrator.bind_tool(&mode)?;
        log::info!(
            "canvas mounted at {}x{} in {mode} mode",
            orchestrator.params.canvas_width,
            orchestrator.params.canvas_height
        );
        Ok(orchestrator)
    }

    /// Apply a new set of host parameters.
    ///
    /// Invalid colors, dimensions or drawings are rejected before anything
    /// changes. An unknown drawing mode is accepted but leaves no tool bound.
    pub fn update_params(&mut self, params: HostParams) -> Result<(), ConfigError> {
        params.validate_dimensions()?;
        let tool_params = params.tool_params()?;
        let new_drawing = if params.initial_drawing != self.params.initial_drawing {
            Some(params.initial_snapshot()?)
        } else {
            None
        };

        let resized = params.canvas_width != self.params.canvas_width
            || params.canvas_height != self.params.canvas_height;
        let background_changed = params.background_url() != self.params.background_url();
        let mode_changed = params.drawing_mode != self.params.drawing_mode;
        let rebind = mode_changed || tool_params != self.tool_params || self.binding.is_none();
        let old = std::mem::replace(&mut self.params, params);
        self.tool_params = tool_params;

        if resized {
            self.resize_preserving_content(old.canvas_width, old.canvas_height);
        }

        if let Some(snapshot) = new_drawing {
            self.replace_document(snapshot)?;
        } else if resized || background_changed {
            self.apply_background();
        }

        if rebind {
            if mode_changed {
                self.edit_generation.advance();
            }
            let mode = self.params.drawing_mode.clone();
            self.bind_tool(&mode)?;
        }
        Ok(())
    }

    fn resize_preserving_content(&mut self, old_width: u32, old_height: u32) {
        let snapshot = self.canvas.serialize();
        self.canvas.resize(
            f64::from(self.params.canvas_width),
            f64::from(self.params.canvas_height),
        );
        if let Err(e) = self.canvas.load(&snapshot) {
            log::error!("failed to restore content after resize: {e}");
        }
        log::debug!(
            "resized canvas {old_width}x{old_height} -> {}x{}",
            self.params.canvas_width,
            self.params.canvas_height
        );
    }

    /// Load a drawing pushed by the host and restart history from it.
    fn replace_document(&mut self, snapshot: Snapshot) -> Result<(), ConfigError> {
        self.canvas
            .load(&snapshot)
            .map_err(|e| ConfigError::InvalidDrawing(e.to_string()))?;
        self.history.reset(snapshot);
        self.edit_generation.advance();
        self.apply_background();
        log::debug!("host replaced the document");
        Ok(())
    }

    /// Release the current tool and its session listeners.
    fn unbind(&mut self) {
        if let Some(binding) = self.binding.take() {
            let kind = binding.tool.kind();
            let removed = binding.teardown.release(&mut self.bus) + binding.session.release(&mut self.bus);
            log::debug!("tore down {kind} tool ({removed} listeners)");
        }
    }

    fn bind_tool(&mut self, mode: &str) -> Result<(), ConfigError> {
        self.unbind();
        let mut tool = self.registry.resolve(mode).inspect_err(|e| log::error!("{e}"))?;

        let mut registrar = Registrar::new(&mut self.bus, Owner::Tool(tool.kind()));
        tool.configure(&mut self.canvas, &self.tool_params, &mut registrar);
        let teardown = registrar.finish();

        let mut registrar = Registrar::new(&mut self.bus, Owner::Session);
        registrar.on(Channel::PointerUp, Handler::Commit);
        registrar.on(Channel::DoubleClick, Handler::Commit);
        let session = registrar.finish();

        log::debug!("configured {} tool ({} listeners)", tool.kind(), teardown.len());
        self.binding = Some(Binding {
            tool,
            teardown,
            session,
        });
        Ok(())
    }

    /// Feed one pointer event through the canvas and the listeners.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> DispatchReport {
        self.reconcile();
        let mut report = DispatchReport::default();

        if let PointerEvent::Wheel { position, delta_y } = event {
            let zoom = zoom_after_wheel(self.canvas.zoom(), delta_y);
            self.canvas.zoom_to_point(position, zoom);
            return report;
        }

        let point = self.canvas.to_canvas_point(event.position());
        let native = self.canvas.handle_native(&event, point);
        if let Some(stroke) = native.stroke {
            self.dispatch(Channel::PathCreated, &CanvasEvent::PathCreated(stroke), &mut report);
        }

        let channel = match event {
            PointerEvent::Down { .. } => Channel::PointerDown,
            PointerEvent::Move { .. } => Channel::PointerMove,
            PointerEvent::Up { .. } => Channel::PointerUp,
            PointerEvent::Out { .. } => Channel::PointerOut,
            PointerEvent::DoubleClick { .. } => Channel::DoubleClick,
            PointerEvent::Wheel { .. } => return report,
        };
        let info = PointerInfo {
            point,
            button: event.button(),
            target: native.target,
        };
        self.dispatch(channel, &CanvasEvent::Pointer(info), &mut report);
        report
    }

    /// Feed one key press to the key listeners.
    pub fn handle_key(&mut self, key: Key) -> DispatchReport {
        self.reconcile();
        let mut report = DispatchReport::default();
        self.dispatch(Channel::KeyDown, &CanvasEvent::Key(key), &mut report);
        report
    }

    fn dispatch(&mut self, channel: Channel, event: &CanvasEvent, report: &mut DispatchReport) {
        for listener in self.bus.listeners_for(channel) {
            match listener.owner {
                Owner::Session => self.commit(event),
                Owner::Tool(kind) => match &mut self.binding {
                    Some(binding) if binding.tool.kind() == kind => {
                        let mut ctx = ToolContext::new(
                            &mut self.canvas,
                            &self.services,
                            &mut self.jobs,
                            self.edit_generation,
                        );
                        binding.tool.handle(listener.handler, event, &mut ctx);
                    }
                    _ => {
                        log::warn!("skipping listener of unbound {kind} tool");
                        continue;
                    }
                },
            }
            report.fired.push(listener);
        }
    }

    /// Record the canvas at a commit boundary.
    fn commit(&mut self, event: &CanvasEvent) {
        let kind = match event.pointer() {
            Some(PointerInfo {
                button: Some(MouseButton::Right),
                ..
            }) => CommitKind::ForceSync,
            _ => CommitKind::Edit,
        };
        if self.history.push(self.canvas.serialize(), kind) == PushOutcome::Recorded {
            log::trace!("committed snapshot {}", self.history.cursor());
        }
    }

    /// Bring the canvas in line with the history cursor if it moved.
    fn reconcile(&mut self) {
        if !self.history.take_reload() {
            return;
        }
        let snapshot = self.history.current().clone();
        if let Err(e) = self.canvas.load(&snapshot) {
            log::error!("failed to reload canvas from history: {e}");
        }
        self.edit_generation.advance();
        // The load wiped the background image; put it back on top.
        self.apply_background();
    }

    pub fn undo(&mut self) -> bool {
        let moved = self.history.undo();
        self.reconcile();
        moved
    }

    pub fn redo(&mut self) -> bool {
        let moved = self.history.redo();
        self.reconcile();
        moved
    }

    /// Toolbar reset: back to the drawing the history was last reset to.
    pub fn reset_to_initial(&mut self) {
        let initial = self.history.initial().clone();
        if let Err(e) = self.canvas.load(&initial) {
            log::error!("failed to reset canvas: {e}");
            return;
        }
        self.history.reset(initial);
        self.history.force_sync();
        self.edit_generation.advance();
        self.apply_background();
    }

    pub fn reset_zoom(&mut self) {
        self.canvas.reset_viewport();
    }

    /// Send the current snapshot to the host even with realtime sync off.
    pub fn force_sync(&mut self) {
        self.history.force_sync();
    }

    /// Run once per frame: apply finished async work, reconcile, and hand
    /// back a host update when one is due.
    pub fn render_pass(&mut self, now: Instant) -> Option<HostUpdate> {
        self.poll_tasks();
        self.reconcile();
        let update = HostUpdate {
            raw: Arc::clone(self.history.current()),
            width: self.params.canvas_width,
            height: self.params.canvas_height,
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        };
        let force = self.history.take_force_send();
        self.bridge.observe(update, self.params.realtime_update, force, now);
        self.bridge.flush(now)
    }

    /// Apply every async job that has finished. Returns how many were applied.
    pub fn poll_tasks(&mut self) -> usize {
        let mut applied = 0;
        for completion in self.jobs.poll_ready() {
            if self.apply_completion(completion) {
                applied += 1;
            }
        }
        applied
    }

    fn apply_completion(&mut self, completion: Completion) -> bool {
        let Completion {
            job,
            generation,
            result,
        } = completion;
        let current = match job {
            Job::Background { .. } => self.background_generation,
            _ => self.edit_generation,
        };
        if generation != current {
            log::debug!("discarding stale {job:?} from {generation:?}, now at {current:?}");
            return false;
        }
        let image = match result {
            Ok(image) => image,
            Err(LoadError::Cancelled) => {
                log::debug!("{job:?} cancelled");
                return false;
            }
            Err(e) => {
                log::warn!("{job:?} failed: {e}");
                return false;
            }
        };

        match job {
            Job::Background { url } => {
                self.install_background(&image);
                self.background_cache = Some((url, image));
            }
            Job::InsertImage { at } => {
                self.canvas
                    .add(Shape::Image(Image::new(at, image.src, image.width, image.height)));
                self.history.push(self.canvas.serialize(), CommitKind::Edit);
            }
            Job::EraseCutout { replaced, origin } => {
                for id in replaced {
                    if self.canvas.remove(id).is_none() {
                        log::debug!("erased object {id} was already gone");
                    }
                }
                self.canvas
                    .add(Shape::Image(Image::new(origin, image.src, image.width, image.height)));
                self.history.push(self.canvas.serialize(), CommitKind::Edit);
            }
        }
        true
    }

    /// (Re)apply the configured background image. Cached images go on
    /// immediately; anything else is loaded asynchronously.
    fn apply_background(&mut self) {
        let generation = self.background_generation.advance();
        let Some(url) = self.params.background_url() else {
            self.canvas.set_background_image(None);
            return;
        };
        let cached = self
            .background_cache
            .as_ref()
            .filter(|(cached_url, _)| *cached_url == url)
            .map(|(_, image)| image.clone());
        match cached {
            Some(image) => self.install_background(&image),
            None => {
                let future = self.services.loader.load(ImageSource::Url(url.clone()));
                self.jobs.spawn(Job::Background { url }, generation, future);
            }
        }
    }

    fn install_background(&mut self, image: &LoadedImage) {
        let scale = if image.height > 0 {
            f64::from(self.params.canvas_height) / f64::from(image.height)
        } else {
            1.0
        };
        self.canvas.set_background_image(Some(BackgroundImage {
            src: image.src.clone(),
            width: image.width,
            height: image.height,
            scale,
        }));
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn params(&self) -> &HostParams {
        &self.params
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn active_tool(&self) -> Option<ToolKind> {
        self.binding.as_ref().map(|b| b.tool.kind())
    }

    pub fn pending_jobs(&self) -> usize {
        self.jobs.len()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeLoader, FakeRasterizer, Gate, USER_FILE_SIZE};
    use kurbo::{Point, Rect, Size};
    use std::time::Duration;

    fn params(mode: &str) -> HostParams {
        HostParams {
            drawing_mode: mode.into(),
            ..HostParams::default()
        }
    }

    fn mount(params: HostParams) -> Orchestrator {
        let canvas = MemoryCanvas::new(1.0, 1.0);
        Orchestrator::new(canvas, Services::new(FakeLoader::default(), FakeRasterizer), params).unwrap()
    }

    fn mount_gated(params: HostParams) -> (Orchestrator, Gate) {
        let (loader, gate) = FakeLoader::gated();
        let canvas = MemoryCanvas::new(1.0, 1.0);
        let orchestrator = Orchestrator::new(canvas, Services::new(loader, FakeRasterizer), params).unwrap();
        (orchestrator, gate)
    }

    fn down(o: &mut Orchestrator, x: f64, y: f64) -> DispatchReport {
        o.handle_pointer(PointerEvent::Down {
            position: Point::new(x, y),
            button: MouseButton::Left,
        })
    }

    fn move_to(o: &mut Orchestrator, x: f64, y: f64) -> DispatchReport {
        o.handle_pointer(PointerEvent::Move {
            position: Point::new(x, y),
        })
    }

    fn up(o: &mut Orchestrator, x: f64, y: f64) -> DispatchReport {
        o.handle_pointer(PointerEvent::Up {
            position: Point::new(x, y),
            button: MouseButton::Left,
        })
    }

    fn drag(o: &mut Orchestrator, from: (f64, f64), to: (f64, f64)) {
        down(o, from.0, from.1);
        move_to(o, to.0, to.1);
        up(o, to.0, to.1);
    }

    fn switch_mode(o: &mut Orchestrator, mode: &str) -> Result<(), ConfigError> {
        let mut next = o.params().clone();
        next.drawing_mode = mode.into();
        o.update_params(next)
    }

    fn bounds(o: &Orchestrator) -> Vec<Rect> {
        o.canvas().shapes_ordered().map(Shape::bounds).collect()
    }

    #[test]
    fn test_mount_binds_mode_and_commit_listeners() {
        let o = mount(params("rect"));
        assert_eq!(o.active_tool(), Some(ToolKind::Rect));
        assert_eq!(o.bus().owned_by(Owner::Tool(ToolKind::Rect)), 4);
        assert_eq!(o.bus().owned_by(Owner::Session), 2);
        assert_eq!(o.canvas().size(), Size::new(600.0, 400.0));
        assert_eq!(o.history().len(), 1);
    }

    #[test]
    fn test_undo_then_divergent_edit_drops_redo_branch() {
        let mut o = mount(params("rect"));
        drag(&mut o, (10.0, 10.0), (60.0, 60.0));
        drag(&mut o, (100.0, 100.0), (160.0, 160.0));
        assert_eq!(o.history().len(), 3);

        assert!(o.undo());
        assert_eq!(o.history().cursor(), 1);
        assert_eq!(o.canvas().len(), 1);
        assert!(o.can_redo());

        drag(&mut o, (300.0, 100.0), (350.0, 150.0));
        assert_eq!(o.history().len(), 3);
        assert_eq!(o.history().cursor(), 2);
        assert!(!o.can_redo());
        assert_eq!(
            bounds(&o),
            vec![Rect::new(10.0, 10.0, 60.0, 60.0), Rect::new(300.0, 100.0, 350.0, 150.0)]
        );

        assert!(o.undo());
        assert!(o.redo());
        assert_eq!(o.canvas().serialize(), **o.history().current());
    }

    #[test]
    fn test_click_without_change_records_nothing() {
        let mut o = mount(params("transform"));
        down(&mut o, 10.0, 10.0);
        up(&mut o, 10.0, 10.0);
        assert_eq!(o.history().len(), 1);
        assert!(!o.can_undo());
    }

    #[test]
    fn test_foreign_version_survives_no_op_commit() {
        let drawing = serde_json::json!({
            "version": "5.3.0",
            "objects": [
                {"type": "rect", "position": {"x": 1.0, "y": 2.0}, "width": 30.0, "height": 40.0}
            ]
        });
        let mut o = mount(HostParams {
            initial_drawing: Some(drawing),
            ..params("transform")
        });
        down(&mut o, 300.0, 300.0);
        up(&mut o, 300.0, 300.0);
        assert_eq!(o.history().len(), 1);
        assert!(!o.can_undo());
        assert_eq!(o.history().current().version, "5.3.0");
    }

    #[test]
    fn test_switching_tools_leaves_no_stale_listeners() {
        let mut o = mount(params("rect"));
        switch_mode(&mut o, "text").unwrap();
        assert_eq!(o.bus().owned_by(Owner::Tool(ToolKind::Rect)), 0);

        let report = down(&mut o, 100.0, 100.0);
        assert_eq!(report.fired_by(Owner::Tool(ToolKind::Rect)), 0);
        assert_eq!(report.fired_by(Owner::Tool(ToolKind::Text)), 1);
        move_to(&mut o, 200.0, 150.0);
        let report = up(&mut o, 200.0, 150.0);
        assert_eq!(report.fired_handler(Handler::Commit), 1);
        assert!(o.canvas().shapes_ordered().all(Shape::is_text));

        switch_mode(&mut o, "rect").unwrap();
        assert_eq!(o.bus().owned_by(Owner::Tool(ToolKind::Text)), 0);
        assert_eq!(o.bus().owned_by(Owner::Tool(ToolKind::Rect)), 4);
        assert_eq!(o.bus().count(Owner::Session, Handler::Commit), 2);
        let report = o.handle_key(Key::Character('x'));
        assert!(report.is_empty());
    }

    #[test]
    fn test_style_change_rebinds_without_duplicates() {
        let mut o = mount(params("rect"));
        let mut next = o.params().clone();
        next.stroke_width = 4.0;
        o.update_params(next).unwrap();
        assert_eq!(o.bus().len(), 6);
        let report = down(&mut o, 0.0, 0.0);
        assert_eq!(report.fired_handler(Handler::PointerDown), 1);
    }

    #[test]
    fn test_resize_preserves_content() {
        let mut o = mount(HostParams {
            canvas_width: 400,
            canvas_height: 300,
            ..params("rect")
        });
        drag(&mut o, (10.0, 20.0), (110.0, 120.0));
        drag(&mut o, (200.0, 150.0), (260.0, 290.0));
        let before = bounds(&o);

        let mut next = o.params().clone();
        next.canvas_width = 800;
        next.canvas_height = 600;
        o.update_params(next).unwrap();

        assert_eq!(o.canvas().size(), Size::new(800.0, 600.0));
        assert_eq!(bounds(&o), before);
        assert_eq!(o.history().len(), 3);
    }

    #[test]
    fn test_eraser_replaces_overlapping_rects_and_undo_restores_them() {
        let mut o = mount(params("rect"));
        drag(&mut o, (0.0, 0.0), (100.0, 100.0));
        drag(&mut o, (50.0, 50.0), (150.0, 150.0));
        let rects = bounds(&o);

        switch_mode(&mut o, "eraser").unwrap();
        down(&mut o, 75.0, 20.0);
        move_to(&mut o, 75.0, 75.0);
        up(&mut o, 75.0, 130.0);
        assert_eq!(o.pending_jobs(), 1);

        o.render_pass(Instant::now());
        let objects = o.canvas().serialize().objects;
        assert_eq!(objects.len(), 1);
        let Shape::Image(cutout) = &objects[0] else {
            panic!("expected the cutout image");
        };
        // Both rects with their 20px strokes: (-10, -10) to (160, 160).
        assert_eq!(cutout.position, Point::new(-10.0, -10.0));
        assert!((cutout.width - 170.0).abs() < f64::EPSILON);
        assert_eq!(o.history().len(), 4);

        assert!(o.undo());
        assert_eq!(bounds(&o), rects);
        assert!(o.canvas().shapes_ordered().all(|s| matches!(s, Shape::Rect(_))));
    }

    #[test]
    fn test_eraser_across_textbox_keeps_the_text() {
        let mut o = mount(params("rect"));
        drag(&mut o, (0.0, 0.0), (100.0, 100.0));
        let mut text = crate::shapes::Text::new(Point::new(0.0, 120.0), "Luckiest Guy", 20.0);
        text.width = 100.0;
        text.height = 30.0;
        text.content = "hello".into();
        let text_id = o.canvas_mut().add(Shape::Textbox(text));

        switch_mode(&mut o, "eraser").unwrap();
        down(&mut o, 50.0, 50.0);
        move_to(&mut o, 50.0, 100.0);
        up(&mut o, 50.0, 140.0);
        o.render_pass(Instant::now());

        let objects = o.canvas().serialize().objects;
        assert_eq!(objects.len(), 2);
        let kept = o.canvas().get(text_id).and_then(Shape::as_text).unwrap();
        assert_eq!(kept.content, "hello");
        assert_eq!(objects.iter().filter(|s| s.is_image()).count(), 1);
        assert!(objects.iter().all(|s| !matches!(s, Shape::Rect(_))));
    }

    #[test]
    fn test_stale_cutout_discarded_after_undo() {
        let (mut o, gate) = mount_gated(params("rect"));
        drag(&mut o, (0.0, 0.0), (100.0, 100.0));
        drag(&mut o, (50.0, 50.0), (150.0, 150.0));
        switch_mode(&mut o, "eraser").unwrap();
        down(&mut o, 75.0, 20.0);
        up(&mut o, 75.0, 130.0);
        assert_eq!(gate.held(), 1);

        assert!(o.undo());
        gate.release_all();
        assert_eq!(o.poll_tasks(), 0);
        assert_eq!(o.canvas().len(), 1);
        assert!(o.canvas().shapes_ordered().all(|s| !s.is_image()));
        assert_eq!(o.history().len(), 3);
    }

    #[test]
    fn test_unknown_mode_binds_nothing() {
        let mut o = mount(params("rect"));
        assert_eq!(
            switch_mode(&mut o, "lasso"),
            Err(ConfigError::UnknownMode("lasso".into()))
        );
        assert_eq!(o.active_tool(), None);
        assert!(o.bus().is_empty());
        assert!(down(&mut o, 10.0, 10.0).is_empty());

        switch_mode(&mut o, "rect").unwrap();
        assert_eq!(o.bus().len(), 6);

        let canvas = MemoryCanvas::new(1.0, 1.0);
        let mounted = Orchestrator::new(
            canvas,
            Services::new(FakeLoader::default(), FakeRasterizer),
            params("lasso"),
        );
        assert!(matches!(mounted, Err(ConfigError::UnknownMode(_))));
    }

    #[test]
    fn test_invalid_params_change_nothing() {
        let mut o = mount(params("rect"));
        let mut next = o.params().clone();
        next.canvas_width = 0;
        next.drawing_mode = "text".into();
        assert!(o.update_params(next).is_err());
        assert_eq!(o.active_tool(), Some(ToolKind::Rect));
        assert_eq!(o.canvas().size(), Size::new(600.0, 400.0));
    }

    #[test]
    fn test_right_click_forces_sync_without_realtime() {
        let mut o = mount(HostParams {
            realtime_update: false,
            ..params("rect")
        });
        let t0 = Instant::now();
        drag(&mut o, (10.0, 10.0), (60.0, 60.0));
        assert_eq!(o.render_pass(t0), None);
        assert_eq!(o.render_pass(t0 + Duration::from_millis(200)), None);

        o.handle_pointer(PointerEvent::Down {
            position: Point::new(300.0, 300.0),
            button: MouseButton::Right,
        });
        o.handle_pointer(PointerEvent::Up {
            position: Point::new(300.0, 300.0),
            button: MouseButton::Right,
        });
        let t1 = t0 + Duration::from_millis(300);
        assert_eq!(o.render_pass(t1), None);
        let update = o.render_pass(t1 + Duration::from_millis(100)).unwrap();
        assert_eq!(update.raw.len(), 1);
        assert!(update.can_undo);
    }

    #[test]
    fn test_force_sync_button() {
        let mut o = mount(HostParams {
            realtime_update: false,
            ..params("rect")
        });
        let t0 = Instant::now();
        o.force_sync();
        o.render_pass(t0);
        assert!(o.render_pass(t0 + Duration::from_millis(100)).is_some());
        assert_eq!(o.render_pass(t0 + Duration::from_millis(500)), None);
    }

    #[test]
    fn test_freedraw_commit_reaches_host() {
        let mut o = mount(HostParams::default());
        let t0 = Instant::now();
        down(&mut o, 10.0, 10.0);
        move_to(&mut o, 20.0, 30.0);
        let report = up(&mut o, 40.0, 35.0);
        assert_eq!(report.fired_handler(Handler::PathCreated), 1);
        assert_eq!(report.fired_handler(Handler::Commit), 1);
        // The path is created before the commit runs.
        assert_eq!(report.fired[0].handler, Handler::PathCreated);

        assert!(o.render_pass(t0).is_none());
        let update = o.render_pass(t0 + Duration::from_millis(100)).unwrap();
        assert!(matches!(update.raw.objects.as_slice(), [Shape::Path(_)]));

        // Nothing new: nothing sent.
        assert_eq!(o.render_pass(t0 + Duration::from_millis(300)), None);
    }

    #[test]
    fn test_background_scaled_and_reapplied_after_undo() {
        let mut o = mount(HostParams {
            background_image_url: Some("/media/bg.png".into()),
            host_url: Some("http://localhost:8501/page".into()),
            ..params("rect")
        });
        assert!(o.canvas().background_image().is_none());
        o.render_pass(Instant::now());
        let background = o.canvas().background_image().cloned().unwrap();
        assert_eq!(background.src, "http://localhost:8501/media/bg.png");
        assert!((background.scale - 2.0).abs() < f64::EPSILON);

        drag(&mut o, (10.0, 10.0), (60.0, 60.0));
        assert!(o.undo());
        assert_eq!(o.canvas().background_image(), Some(&background));
        assert_eq!(o.pending_jobs(), 0);
        assert!(o.canvas().serialize().is_empty());
    }

    #[test]
    fn test_removing_background_url_clears_it() {
        let mut o = mount(HostParams {
            background_image_url: Some("http://cdn/bg.png".into()),
            ..params("rect")
        });
        o.poll_tasks();
        assert!(o.canvas().background_image().is_some());

        let mut next = o.params().clone();
        next.background_image_url = None;
        o.update_params(next).unwrap();
        assert!(o.canvas().background_image().is_none());
    }

    #[test]
    fn test_stale_background_load_discarded() {
        let (mut o, gate) = mount_gated(HostParams {
            background_image_url: Some("http://cdn/first.png".into()),
            ..params("rect")
        });
        let mut next = o.params().clone();
        next.background_image_url = Some("http://cdn/second.png".into());
        o.update_params(next).unwrap();
        assert_eq!(gate.held(), 2);

        gate.release_all();
        assert_eq!(o.poll_tasks(), 1);
        assert_eq!(
            o.canvas().background_image().map(|b| b.src.as_str()),
            Some("http://cdn/second.png")
        );
    }

    #[test]
    fn test_new_initial_drawing_resets_history() {
        let mut o = mount(params("rect"));
        drag(&mut o, (10.0, 10.0), (60.0, 60.0));
        assert!(o.can_undo());

        let drawing = serde_json::json!({
            "version": "4.4.0",
            "objects": [
                {"type": "rect", "position": {"x": 1.0, "y": 2.0}, "width": 30.0, "height": 40.0, "corner_radius": 0.0}
            ]
        });
        let mut next = o.params().clone();
        next.initial_drawing = Some(drawing);
        o.update_params(next.clone()).unwrap();
        assert_eq!(o.history().len(), 1);
        assert!(!o.can_undo());
        assert_eq!(bounds(&o), vec![Rect::new(1.0, 2.0, 31.0, 42.0)]);

        // The same drawing again is not a new document.
        drag(&mut o, (100.0, 100.0), (160.0, 160.0));
        o.update_params(next).unwrap();
        assert_eq!(o.history().len(), 2);
    }

    #[test]
    fn test_reset_to_initial() {
        let mut o = mount(HostParams {
            realtime_update: false,
            ..params("rect")
        });
        drag(&mut o, (10.0, 10.0), (60.0, 60.0));
        drag(&mut o, (100.0, 100.0), (160.0, 160.0));
        o.reset_to_initial();
        assert!(o.canvas().is_empty());
        assert_eq!(o.history().len(), 1);

        let t0 = Instant::now();
        o.render_pass(t0);
        let update = o.render_pass(t0 + Duration::from_millis(100)).unwrap();
        assert!(update.raw.is_empty());
        assert!(!update.can_undo);
    }

    #[test]
    fn test_image_insert_commits_on_completion() {
        let mut o = mount(params("image"));
        let report = down(&mut o, 30.0, 40.0);
        assert_eq!(report.fired_by(Owner::Tool(ToolKind::Image)), 1);
        up(&mut o, 30.0, 40.0);
        assert_eq!(o.history().len(), 1);

        assert_eq!(o.poll_tasks(), 1);
        let objects = o.canvas().serialize().objects;
        let Shape::Image(image) = &objects[0] else {
            panic!("expected an image");
        };
        assert_eq!(image.position, Point::new(30.0, 40.0));
        assert!((image.width - f64::from(USER_FILE_SIZE.0)).abs() < f64::EPSILON);
        assert_eq!(o.history().len(), 2);
    }

    #[test]
    fn test_wheel_zoom_and_reset() {
        let mut o = mount(params("rect"));
        let report = o.handle_pointer(PointerEvent::Wheel {
            position: Point::new(100.0, 100.0),
            delta_y: -1000.0,
        });
        assert!(report.is_empty());
        assert!((o.canvas().zoom() - 2.0).abs() < 1e-9);

        // Drawing happens in canvas space.
        drag(&mut o, (100.0, 100.0), (200.0, 200.0));
        assert_eq!(bounds(&o), vec![Rect::new(100.0, 100.0, 150.0, 150.0)]);

        o.reset_zoom();
        assert!(o.canvas().viewport().is_identity());
    }

    #[test]
    fn test_double_click_commits_transform_delete() {
        let mut o = mount(params("rect"));
        drag(&mut o, (10.0, 10.0), (110.0, 110.0));
        switch_mode(&mut o, "transform").unwrap();
        let report = o.handle_pointer(PointerEvent::DoubleClick {
            position: Point::new(60.0, 60.0),
        });
        assert_eq!(report.fired_handler(Handler::Commit), 1);
        assert!(o.canvas().is_empty());
        assert_eq!(o.history().len(), 3);
    }
}
