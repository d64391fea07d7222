//! Replaying a script against the engine on a virtual clock.

use crate::script::{Script, Step};
use inkbridge_core::sync::DEFAULT_DEBOUNCE_MS;
use inkbridge_core::{ConfigError, HostParams, HostUpdate, Key, MemoryCanvas, Orchestrator, Services};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid host parameters: {0}")]
    Config(#[from] ConfigError),
    #[error("step {step}: {source}")]
    Step { step: usize, source: ConfigError },
}

/// Drives an [`Orchestrator`] the way the host page would: one render pass
/// after every input, with time only advancing on `tick` steps.
pub struct Replay {
    orchestrator: Orchestrator<MemoryCanvas>,
    start: Instant,
    elapsed: Duration,
    updates: Vec<HostUpdate>,
}

impl Replay {
    pub fn new(params: HostParams, services: Services) -> Result<Self, ReplayError> {
        let canvas = MemoryCanvas::new(f64::from(params.canvas_width), f64::from(params.canvas_height));
        let orchestrator = Orchestrator::new(canvas, services, params)?;
        let mut replay = Self {
            orchestrator,
            start: Instant::now(),
            elapsed: Duration::ZERO,
            updates: Vec::new(),
        };
        replay.render();
        Ok(replay)
    }

    fn render(&mut self) {
        let now = self.start + self.elapsed;
        if let Some(update) = self.orchestrator.render_pass(now) {
            log::info!(
                "host update at {}ms: {} objects, undo={} redo={}",
                self.elapsed.as_millis(),
                update.raw.objects.len(),
                update.can_undo,
                update.can_redo
            );
            self.updates.push(update);
        }
    }

    pub fn step(&mut self, index: usize, step: Step) -> Result<(), ReplayError> {
        log::debug!("step {index}: {step:?}");
        match step {
            Step::Pointer { event } => {
                let report = self.orchestrator.handle_pointer(event);
                log::trace!("{} listeners fired", report.len());
            }
            Step::Key { name } => {
                self.orchestrator.handle_key(Key::from_name(&name));
            }
            Step::Undo => {
                if !self.orchestrator.undo() {
                    log::debug!("step {index}: nothing to undo");
                }
            }
            Step::Redo => {
                if !self.orchestrator.redo() {
                    log::debug!("step {index}: nothing to redo");
                }
            }
            Step::Reset => self.orchestrator.reset_to_initial(),
            Step::ForceSync => self.orchestrator.force_sync(),
            Step::ResetZoom => self.orchestrator.reset_zoom(),
            Step::SetParams { params } => self
                .orchestrator
                .update_params(params)
                .map_err(|source| ReplayError::Step { step: index, source })?,
            Step::Tick { ms } => self.elapsed += Duration::from_millis(ms),
        }
        self.render();
        Ok(())
    }

    /// Run every step, then let the debounce window lapse so a pending
    /// update is delivered.
    pub fn run(mut self, steps: Vec<Step>) -> Result<Vec<HostUpdate>, ReplayError> {
        for (index, step) in steps.into_iter().enumerate() {
            self.step(index, step)?;
        }
        self.elapsed += Duration::from_millis(DEFAULT_DEBOUNCE_MS);
        self.render();
        Ok(self.updates)
    }
}

/// Replay a whole script and return the updates the host would have received.
pub fn replay(script: Script, services: Services) -> Result<Vec<HostUpdate>, ReplayError> {
    Replay::new(script.params, services)?.run(script.steps)
}
