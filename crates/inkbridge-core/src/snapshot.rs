//! Serialized canvas state as exchanged with the host and kept in history.

use crate::shapes::{Shape, ShapeId};
use serde::{Deserialize, Serialize};

/// Format version written into every snapshot.
pub const SNAPSHOT_VERSION: &str = "4.4.0";

fn default_version() -> String {
    SNAPSHOT_VERSION.to_string()
}

/// The complete drawable content of a canvas.
///
/// Objects are stored back to front. The background *image* is never part
/// of a snapshot; only the background color is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub objects: Vec<Shape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshot {
    /// An empty snapshot.
    pub fn new() -> Self {
        Self {
            version: default_version(),
            objects: Vec::new(),
            background: None,
        }
    }

    /// An empty snapshot carrying a background color. Empty colors are dropped.
    pub fn with_background(color: &str) -> Self {
        Self {
            background: (!color.is_empty()).then(|| color.to_string()),
            ..Self::new()
        }
    }

    pub fn from_objects(objects: Vec<Shape>) -> Self {
        Self {
            objects,
            ..Self::new()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn find(&self, id: ShapeId) -> Option<&Shape> {
        self.objects.iter().find(|s| s.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Freehand, Rectangle, Text};
    use kurbo::Point;

    #[test]
    fn test_json_keeps_order_and_background() {
        let mut snapshot = Snapshot::with_background("#fff");
        snapshot
            .objects
            .push(Shape::Rect(Rectangle::new(Point::new(0.0, 0.0), 10.0, 10.0)));
        snapshot.objects.push(Shape::Path(Freehand::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 5.0),
        ])));

        let json = snapshot.to_json().unwrap();
        let back = Snapshot::from_json(&json).unwrap();
        assert_eq!(back, snapshot);
        assert_eq!(back.objects[0].kind_name(), "rect");
        assert_eq!(back.objects[1].kind_name(), "path");
    }

    #[test]
    fn test_missing_fields_are_defaulted() {
        let snapshot = Snapshot::from_json("{}").unwrap();
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.background, None);
    }

    #[test]
    fn test_objects_without_ids_get_fresh_ones() {
        let json = r#"{"objects":[
            {"type":"textbox","position":{"x":1.0,"y":2.0},"width":10.0,"height":10.0,
             "content":"hi","font_family":"Luckiest Guy","font_size":20.0}
        ]}"#;
        let snapshot = Snapshot::from_json(json).unwrap();
        let text: &Text = snapshot.objects[0].as_text().unwrap();
        assert_eq!(text.content, "hi");
        assert!(snapshot.find(text.id).is_some());
    }

    #[test]
    fn test_empty_background_color_is_dropped() {
        assert_eq!(Snapshot::with_background("").background, None);
        assert_eq!(
            Snapshot::with_background("#eee").background.as_deref(),
            Some("#eee")
        );
    }
}
