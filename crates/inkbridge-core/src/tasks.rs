//! Pending asynchronous image work and its staleness tracking.
//!
//! Every job is tagged with the [`Generation`] that was current when it was
//! spawned. The orchestrator advances generations when the document is
//! reloaded or replaced, and compares tags on completion so results that
//! belong to a superseded canvas state are dropped.

use crate::services::{BoxFuture, LoadError, LoadedImage};
use crate::shapes::ShapeId;
use kurbo::Point;
use std::task::{Context, Poll, Waker};

/// Monotonic staleness token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn advance(&mut self) -> Self {
        *self = self.next();
        *self
    }
}

/// What to do with a loaded image.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    /// Place the image with its top-left corner at a canvas point.
    InsertImage { at: Point },
    /// Replace the erased objects with their flattened cutout.
    EraseCutout { replaced: Vec<ShapeId>, origin: Point },
    /// Install as the canvas background.
    Background { url: String },
}

#[derive(Debug)]
pub struct Completion {
    pub job: Job,
    pub generation: Generation,
    pub result: Result<LoadedImage, LoadError>,
}

struct PendingJob {
    job: Job,
    generation: Generation,
    future: BoxFuture<'static, Result<LoadedImage, LoadError>>,
}

/// Jobs in flight, polled cooperatively by the orchestrator.
#[derive(Default)]
pub struct JobQueue {
    pending: Vec<PendingJob>,
}

impl std::fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobQueue")
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(
        &mut self,
        job: Job,
        generation: Generation,
        future: BoxFuture<'static, Result<LoadedImage, LoadError>>,
    ) {
        log::debug!("spawned {job:?} at {generation:?}");
        self.pending.push(PendingJob {
            job,
            generation,
            future,
        });
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Poll every pending job once and return those that finished, in spawn order.
    pub fn poll_ready(&mut self) -> Vec<Completion> {
        // Jobs are re-polled on every tick, so wake-ups carry no information.
        let mut cx = Context::from_waker(Waker::noop());
        let mut ready = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            match self.pending[i].future.as_mut().poll(&mut cx) {
                Poll::Ready(result) => {
                    let done = self.pending.remove(i);
                    ready.push(Completion {
                        job: done.job,
                        generation: done.generation,
                        result,
                    });
                }
                Poll::Pending => i += 1,
            }
        }
        ready
    }
}
