//! Mapping from host drawing modes to tool constructors.

use super::{
    AnyTool, EmojiTool, EraserTool, FreedrawTool, ImageTool, PointTool, PolygonTool, ShapeTool,
    TextTool, ToolKind, TransformTool,
};
use crate::config::ConfigError;

/// Builds a fresh, unconfigured tool.
pub type ToolFactory = fn() -> AnyTool;

/// Drawing mode table. Every lookup produces a fresh tool instance, so no
/// state leaks from one binding to the next.
pub struct ToolRegistry {
    entries: Vec<(String, ToolFactory)>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for kind in ToolKind::ALL {
            registry.register(kind.mode(), standard_factory(kind));
        }
        registry
    }
}

fn standard_factory(kind: ToolKind) -> ToolFactory {
    match kind {
        ToolKind::Circle => || AnyTool::Shape(ShapeTool::circle()),
        ToolKind::Freedraw => || AnyTool::Freedraw(FreedrawTool::new()),
        ToolKind::Line => || AnyTool::Shape(ShapeTool::line()),
        ToolKind::Polygon => || AnyTool::Polygon(PolygonTool::new()),
        ToolKind::Rect => || AnyTool::Shape(ShapeTool::rect()),
        ToolKind::Transform => || AnyTool::Transform(TransformTool::new()),
        ToolKind::Point => || AnyTool::Point(PointTool::new()),
        ToolKind::Text => || AnyTool::Text(TextTool::new()),
        ToolKind::Emoji => || AnyTool::Emoji(EmojiTool::new()),
        ToolKind::Image => || AnyTool::Image(ImageTool::new()),
        ToolKind::Eraser => || AnyTool::Eraser(EraserTool::new()),
    }
}

impl ToolRegistry {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a mode, replacing any existing entry with the same name.
    pub fn register(&mut self, mode: &str, factory: ToolFactory) {
        match self.entries.iter_mut().find(|(name, _)| name == mode) {
            Some(entry) => entry.1 = factory,
            None => self.entries.push((mode.to_string(), factory)),
        }
    }

    pub fn contains(&self, mode: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == mode)
    }

    pub fn modes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Build the tool for a drawing mode.
    pub fn resolve(&self, mode: &str) -> Result<AnyTool, ConfigError> {
        self.entries
            .iter()
            .find(|(name, _)| name == mode)
            .map(|(_, factory)| factory())
            .ok_or_else(|| ConfigError::UnknownMode(mode.to_string()))
    }
}
