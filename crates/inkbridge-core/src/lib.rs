//! InkBridge Core
//!
//! Edit history and tool dispatch for a drawable canvas embedded in a host
//! page. The host supplies parameters and receives snapshots; everything in
//! between (tool binding, undo/redo, reloads, background handling and
//! debounced sync) lives here, independent of any rendering backend.

pub mod adapter;
pub mod canvas;
pub mod config;
pub mod history;
pub mod input;
pub mod listeners;
pub mod orchestrator;
pub mod services;
pub mod shapes;
pub mod snapshot;
pub mod sync;
pub mod tasks;
pub mod tools;
pub mod viewport;

#[cfg(test)]
mod test_support;

pub use adapter::{BackgroundImage, Brush, CanvasAdapter, CanvasError, NativeOutcome};
pub use canvas::MemoryCanvas;
pub use config::{ConfigError, HostParams, ToolParams};
pub use history::{ActionSignals, CommitKind, History, PushOutcome};
pub use input::{CanvasEvent, Key, MouseButton, PointerEvent};
pub use listeners::{Channel, EventBus, Handler, Owner};
pub use orchestrator::{DispatchReport, Orchestrator};
pub use services::{ImageLoader, ImageSource, LoadError, LoadedImage, RasterError, RasterImage, Rasterizer, Services};
pub use shapes::{SerializableColor, Shape, ShapeId, ShapeStyle};
pub use snapshot::Snapshot;
pub use sync::{HostSyncBridge, HostUpdate};
pub use tools::{Tool, ToolKind, ToolRegistry};
pub use viewport::Viewport;
