//! Pointer and keyboard events as delivered by the host surface.

use crate::shapes::{SerializableColor, ShapeId};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Distance an arrow key moves the selected object.
pub const ARROW_STEP: f64 = 5.0;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// Map the 1-based button numbering (1 = left, 2 = middle, 3 = right).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(MouseButton::Left),
            2 => Some(MouseButton::Middle),
            3 => Some(MouseButton::Right),
            _ => None,
        }
    }
}

/// Raw pointer event in screen coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
    Out { position: Point },
    DoubleClick { position: Point },
    Wheel { position: Point, delta_y: f64 },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Out { position }
            | PointerEvent::DoubleClick { position }
            | PointerEvent::Wheel { position, .. } => *position,
        }
    }

    pub fn button(&self) -> Option<MouseButton> {
        match self {
            PointerEvent::Down { button, .. } | PointerEvent::Up { button, .. } => Some(*button),
            PointerEvent::DoubleClick { .. } => Some(MouseButton::Left),
            _ => None,
        }
    }
}

/// A key press, named after the DOM `key` values the host reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Delete,
    Backspace,
    Enter,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Character(char),
    Other(String),
}

impl Key {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Delete" => Key::Delete,
            "Backspace" => Key::Backspace,
            "Enter" => Key::Enter,
            "Escape" | "Esc" => Key::Escape,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Character(c),
                    _ => Key::Other(name.to_string()),
                }
            }
        }
    }

    /// Offset applied to the selection for arrow keys.
    pub fn arrow_offset(&self) -> Option<Vec2> {
        match self {
            Key::ArrowUp => Some(Vec2::new(0.0, -ARROW_STEP)),
            Key::ArrowDown => Some(Vec2::new(0.0, ARROW_STEP)),
            Key::ArrowLeft => Some(Vec2::new(-ARROW_STEP, 0.0)),
            Key::ArrowRight => Some(Vec2::new(ARROW_STEP, 0.0)),
            _ => None,
        }
    }
}

/// A finished brush stroke in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub points: Vec<Point>,
    pub width: f64,
    pub color: SerializableColor,
}

/// Pointer data handed to tool handlers, already in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInfo {
    pub point: Point,
    pub button: Option<MouseButton>,
    /// Interactive object under the pointer, if the canvas resolved one.
    pub target: Option<ShapeId>,
}

/// Everything a listener can be called with.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    Pointer(PointerInfo),
    Key(Key),
    PathCreated(Stroke),
}

impl CanvasEvent {
    pub fn pointer(&self) -> Option<&PointerInfo> {
        match self {
            CanvasEvent::Pointer(info) => Some(info),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<&Key> {
        match self {
            CanvasEvent::Key(key) => Some(key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_name() {
        assert_eq!(Key::from_name("Delete"), Key::Delete);
        assert_eq!(Key::from_name("a"), Key::Character('a'));
        assert_eq!(Key::from_name("é"), Key::Character('é'));
        assert_eq!(Key::from_name("Shift"), Key::Other("Shift".into()));
    }

    #[test]
    fn test_arrow_offset() {
        assert_eq!(Key::ArrowLeft.arrow_offset(), Some(Vec2::new(-5.0, 0.0)));
        assert_eq!(Key::Delete.arrow_offset(), None);
    }

    #[test]
    fn test_pointer_event_json() {
        let json = r#"{"kind":"down","position":{"x":1.0,"y":2.0},"button":"right"}"#;
        let event: PointerEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.button(), Some(MouseButton::Right));
        assert_eq!(event.position(), Point::new(1.0, 2.0));
        assert_eq!(MouseButton::from_code(3), Some(MouseButton::Right));
    }
}
