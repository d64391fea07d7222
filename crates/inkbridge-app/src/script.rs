//! Session scripts: the host parameters to mount with and the inputs to
//! replay, one step at a time.
//!
//! ```json
//! {
//!   "params": { "drawingMode": "rect", "realtimeUpdateStreamlit": true },
//!   "steps": [
//!     { "op": "pointer", "event": { "kind": "down", "position": { "x": 10, "y": 10 }, "button": "left" } },
//!     { "op": "pointer", "event": { "kind": "up", "position": { "x": 90, "y": 60 }, "button": "left" } },
//!     { "op": "tick", "ms": 100 },
//!     { "op": "undo" }
//!   ]
//! }
//! ```

use inkbridge_core::{HostParams, PointerEvent};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub params: HostParams,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One recorded input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Pointer input in screen coordinates.
    Pointer { event: PointerEvent },
    /// Key press by its DOM `key` name.
    Key { name: String },
    Undo,
    Redo,
    /// Toolbar reset to the initial drawing.
    Reset,
    /// Toolbar "send to host" button.
    ForceSync,
    ResetZoom,
    /// The host re-rendered the component with new arguments.
    SetParams { params: HostParams },
    /// Let time pass without input.
    Tick { ms: u64 },
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
