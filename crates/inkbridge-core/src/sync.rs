//! Forwarding the current snapshot to the host.
//!
//! The bridge is fed once per render pass. It only forwards when realtime
//! sync is on or a push is forced, skips snapshots the host already has,
//! and debounces bursts so the host channel is not saturated.

use crate::snapshot::Snapshot;
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Default debounce window in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// What the host receives.
#[derive(Debug, Clone, PartialEq)]
pub struct HostUpdate {
    /// The snapshot already recorded in history; shared, never re-serialized.
    pub raw: Arc<Snapshot>,
    pub width: u32,
    pub height: u32,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl HostUpdate {
    /// Wire form of the update.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        Ok(serde_json::json!({
            "raw": self.raw.to_value()?,
            "width": self.width,
            "height": self.height,
            "canUndo": self.can_undo,
            "canRedo": self.can_redo,
        }))
    }
}

struct Pending {
    update: HostUpdate,
    since: Instant,
}

pub struct HostSyncBridge {
    debounce: Duration,
    last_sent: Option<Arc<Snapshot>>,
    pending: Option<Pending>,
}

impl Default for HostSyncBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl HostSyncBridge {
    pub fn new() -> Self {
        Self::with_debounce(Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }

    pub fn with_debounce(debounce: Duration) -> Self {
        Self {
            debounce,
            last_sent: None,
            pending: None,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Offer the current state. Returns whether a push is now scheduled.
    pub fn observe(&mut self, update: HostUpdate, realtime: bool, force: bool, now: Instant) -> bool {
        if !(realtime || force) {
            return self.pending.is_some();
        }

        if let Some(pending) = &mut self.pending {
            if Arc::ptr_eq(&pending.update.raw, &update.raw) {
                // Same snapshot: keep the running timer, refresh the flags.
                pending.update = update;
                return true;
            }
        } else if !force
            && self
                .last_sent
                .as_ref()
                .is_some_and(|sent| Arc::ptr_eq(sent, &update.raw))
        {
            return false;
        }

        if self.pending.is_some() {
            log::trace!("newer snapshot replaces pending host update");
        }
        self.pending = Some(Pending { update, since: now });
        true
    }

    /// When the pending update becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.since + self.debounce)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending update if its debounce window has elapsed.
    pub fn flush(&mut self, now: Instant) -> Option<HostUpdate> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|p| now.saturating_duration_since(p.since) >= self.debounce);
        if !due {
            return None;
        }
        let update = self.pending.take()?.update;
        self.last_sent = Some(update.raw.clone());
        log::debug!("pushing {} objects to host", update.raw.len());
        Some(update)
    }

    /// Forget what the host has, so the next observed state is sent again.
    pub fn invalidate(&mut self) {
        self.last_sent = None;
    }
}
