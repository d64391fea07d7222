//! InkBridge reference host
//!
//! Replays recorded sessions against the engine with local image assets and
//! the CPU rasterizer, collecting what the host page would have received.

pub mod loader;
pub mod replay;
pub mod script;

pub use loader::FsImageLoader;
pub use replay::{Replay, ReplayError, replay};
pub use script::{Script, Step};
