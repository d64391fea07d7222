//! Linear undo/redo history of canvas snapshots.
//!
//! The history owns an ordered stack of snapshots and a cursor pointing at
//! the current one. Every mutation recomputes a pair of one-shot signals that
//! the orchestrator consumes: whether the canvas must be reloaded from the
//! current snapshot, and whether the host must be sent the current snapshot
//! even when realtime sync is off.

use crate::snapshot::Snapshot;
use std::sync::Arc;

/// Default number of snapshots retained before the oldest are dropped.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Edge-triggered signals raised by the last history mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSignals {
    /// The canvas content no longer matches the current snapshot.
    pub should_reload_canvas: bool,
    /// The host must receive the current snapshot regardless of realtime mode.
    pub force_send_to_host: bool,
}

/// How a pushed snapshot should be synchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitKind {
    /// A regular edit; synced only in realtime mode.
    Edit,
    /// An edit that must reach the host immediately.
    ForceSync,
}

/// Result of [`History::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The snapshot equals the current one; nothing was recorded.
    Unchanged,
    /// The snapshot became the new current entry.
    Recorded,
}

#[derive(Debug, Clone)]
pub struct History {
    stack: Vec<Arc<Snapshot>>,
    cursor: usize,
    signals: ActionSignals,
    initial: Arc<Snapshot>,
    limit: usize,
}

impl History {
    pub fn new(initial: impl Into<Arc<Snapshot>>) -> Self {
        Self::with_limit(initial, DEFAULT_HISTORY_LIMIT)
    }

    /// Create a history that keeps at most `limit` snapshots (minimum 1).
    pub fn with_limit(initial: impl Into<Arc<Snapshot>>, limit: usize) -> Self {
        let initial = initial.into();
        Self {
            stack: vec![initial.clone()],
            cursor: 0,
            signals: ActionSignals::default(),
            initial,
            limit: limit.max(1),
        }
    }

    /// The snapshot at the cursor.
    pub fn current(&self) -> &Arc<Snapshot> {
        &self.stack[self.cursor]
    }

    /// The snapshot the history was last reset to.
    pub fn initial(&self) -> &Arc<Snapshot> {
        &self.initial
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.stack.len()
    }

    /// Record a new snapshot after the cursor, discarding the redo branch.
    ///
    /// Pushing a snapshot equal to the current one leaves the stack alone; a
    /// [`CommitKind::ForceSync`] push still raises the force signal.
    pub fn push(&mut self, snapshot: impl Into<Arc<Snapshot>>, kind: CommitKind) -> PushOutcome {
        let snapshot = snapshot.into();
        let force = kind == CommitKind::ForceSync;

        if *snapshot == **self.current() {
            log::trace!("history push ignored, snapshot unchanged");
            if force {
                self.signals.force_send_to_host = true;
            }
            return PushOutcome::Unchanged;
        }

        self.stack.truncate(self.cursor + 1);
        self.stack.push(snapshot);
        self.cursor = self.stack.len() - 1;

        if self.stack.len() > self.limit {
            let excess = self.stack.len() - self.limit;
            self.stack.drain(..excess);
            self.cursor -= excess;
        }

        self.signals = ActionSignals {
            should_reload_canvas: false,
            force_send_to_host: force,
        };
        PushOutcome::Recorded
    }

    /// Step back one snapshot. Returns false at the oldest entry.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            log::debug!("nothing to undo");
            return false;
        }
        self.cursor -= 1;
        self.signals = ActionSignals {
            should_reload_canvas: true,
            force_send_to_host: false,
        };
        true
    }

    /// Step forward one snapshot. Returns false at the newest entry.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            log::debug!("nothing to redo");
            return false;
        }
        self.cursor += 1;
        self.signals = ActionSignals {
            should_reload_canvas: true,
            force_send_to_host: false,
        };
        true
    }

    /// Replace the whole history with a single entry, which also becomes the
    /// initial snapshot. The caller is expected to have loaded it already.
    pub fn reset(&mut self, snapshot: impl Into<Arc<Snapshot>>) {
        let snapshot = snapshot.into();
        self.stack = vec![snapshot.clone()];
        self.cursor = 0;
        self.initial = snapshot;
        self.signals = ActionSignals::default();
    }

    /// Request an unconditional host update for the current snapshot.
    pub fn force_sync(&mut self) {
        self.signals.force_send_to_host = true;
    }

    /// Peek at the pending signals without consuming them.
    pub fn signals(&self) -> ActionSignals {
        self.signals
    }

    /// Consume the reload signal.
    pub fn take_reload(&mut self) -> bool {
        std::mem::take(&mut self.signals.should_reload_canvas)
    }

    /// Consume the force-send signal.
    pub fn take_force_send(&mut self) -> bool {
        std::mem::take(&mut self.signals.force_send_to_host)
    }
}
