//! Host-supplied parameters and what tools derive from them.

use crate::shapes::{SerializableColor, parse_css_color};
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unknown drawing mode: {0}")]
    UnknownMode(String),
    #[error("invalid color for {field}: {value:?}")]
    InvalidColor { field: &'static str, value: String },
    #[error("invalid canvas dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("invalid initial drawing: {0}")]
    InvalidDrawing(String),
}

/// Arguments the host passes on every render, with the host's defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostParams {
    pub fill_color: String,
    pub stroke_width: f64,
    pub stroke_color: String,
    pub background_color: String,
    #[serde(rename = "backgroundImageURL")]
    pub background_image_url: Option<String>,
    #[serde(rename = "realtimeUpdateStreamlit")]
    pub realtime_update: bool,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub drawing_mode: String,
    pub initial_drawing: Option<serde_json::Value>,
    pub display_toolbar: bool,
    pub display_radius: f64,
    pub font_family: String,
    pub font_size: f64,
    pub corner_radius: f64,
    pub emoji: String,
    pub emoji_size: f64,
    /// Page URL of the host; only its origin is used.
    #[serde(rename = "streamlitUrl")]
    pub host_url: Option<String>,
}

impl Default for HostParams {
    fn default() -> Self {
        Self {
            fill_color: "#eee".into(),
            stroke_width: 20.0,
            stroke_color: "black".into(),
            background_color: String::new(),
            background_image_url: None,
            realtime_update: true,
            canvas_width: 600,
            canvas_height: 400,
            drawing_mode: "freedraw".into(),
            initial_drawing: None,
            display_toolbar: true,
            display_radius: 3.0,
            font_family: "Luckiest Guy".into(),
            font_size: 20.0,
            corner_radius: 0.0,
            emoji: "\u{2b50}".into(),
            emoji_size: 48.0,
            host_url: None,
        }
    }
}

/// Style inputs every tool is configured with.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolParams {
    /// `None` when the host asked for a transparent fill.
    pub fill_color: Option<SerializableColor>,
    pub stroke_color: SerializableColor,
    pub stroke_width: f64,
    pub display_radius: f64,
    pub corner_radius: f64,
    pub font_family: String,
    pub font_size: f64,
    pub glyph: String,
    pub glyph_size: f64,
}

fn color(field: &'static str, value: &str) -> Result<SerializableColor, ConfigError> {
    parse_css_color(value).ok_or_else(|| ConfigError::InvalidColor {
        field,
        value: value.to_string(),
    })
}

impl HostParams {
    pub fn tool_params(&self) -> Result<ToolParams, ConfigError> {
        let fill = color("fillColor", &self.fill_color)?;
        Ok(ToolParams {
            fill_color: (!fill.is_transparent()).then_some(fill),
            stroke_color: color("strokeColor", &self.stroke_color)?,
            stroke_width: self.stroke_width.max(0.0),
            display_radius: self.display_radius.max(0.0),
            corner_radius: self.corner_radius.max(0.0),
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            glyph: self.emoji.clone(),
            glyph_size: self.emoji_size,
        })
    }

    pub fn validate_dimensions(&self) -> Result<(), ConfigError> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.canvas_width,
                height: self.canvas_height,
            });
        }
        Ok(())
    }

    /// The drawing the canvas starts from. Without one, an empty drawing on
    /// the configured background color.
    pub fn initial_snapshot(&self) -> Result<Snapshot, ConfigError> {
        match &self.initial_drawing {
            None | Some(serde_json::Value::Null) => {
                Ok(Snapshot::with_background(&self.background_color))
            }
            Some(value) => Snapshot::from_value(value.clone())
                .map_err(|e| ConfigError::InvalidDrawing(e.to_string())),
        }
    }

    /// Fully resolved background image URL, if one is configured.
    pub fn background_url(&self) -> Option<String> {
        let path = self.background_image_url.as_deref().filter(|p| !p.is_empty())?;
        Some(resolve_background_url(path, self.host_url.as_deref()))
    }
}

/// Prefix a background path with the origin of the host page. Absolute URLs
/// and unparsable host URLs leave the path untouched.
pub fn resolve_background_url(path: &str, host_url: Option<&str>) -> String {
    if Url::parse(path).is_ok() {
        return path.to_string();
    }
    let origin = host_url
        .and_then(|raw| Url::parse(raw).ok())
        .map(|url| url.origin())
        .filter(|origin| origin.is_tuple())
        .map(|origin| origin.ascii_serialization());
    match origin {
        Some(origin) => format!("{origin}{path}"),
        None => path.to_string(),
    }
}
