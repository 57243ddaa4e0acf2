//! Text overlay and watermark styles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default font family for captions and the watermark.
pub const DEFAULT_OVERLAY_FONT: &str = "Arial-Bold";
/// Default caption font size.
pub const DEFAULT_TEXT_FONT_SIZE: u32 = 40;
/// Default watermark font size.
pub const DEFAULT_WATERMARK_FONT_SIZE: u32 = 30;
/// Default watermark opacity.
pub const DEFAULT_WATERMARK_OPACITY: f32 = 0.7;

/// Where a caption is anchored on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextPosition {
    /// Horizontally centered, 40px from the top edge
    Top,
    /// Horizontally centered, 20px above the bottom edge
    Bottom,
    /// Any other named anchor; rendered as `Top`
    Named(String),
    /// Explicit top-left coordinate
    At { x: i64, y: i64 },
}

impl Default for TextPosition {
    fn default() -> Self {
        Self::Top
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextPosition::Top => write!(f, "top"),
            TextPosition::Bottom => write!(f, "bottom"),
            TextPosition::Named(name) => write!(f, "{}", name),
            TextPosition::At { x, y } => write!(f, "{},{}", x, y),
        }
    }
}

impl FromStr for TextPosition {
    type Err = std::convert::Infallible;

    /// Parses `top`, `bottom`, or an `x,y` pair. Anything else is kept as a
    /// named anchor so the overlay builder can apply its fallback.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed {
            "top" => return Ok(Self::Top),
            "bottom" => return Ok(Self::Bottom),
            _ => {}
        }

        let coords = trimmed
            .trim_start_matches('(')
            .trim_end_matches(')')
            .split_once(',')
            .and_then(|(x, y)| Some((x.trim().parse().ok()?, y.trim().parse().ok()?)));

        Ok(match coords {
            Some((x, y)) => Self::At { x, y },
            None => Self::Named(trimmed.to_string()),
        })
    }
}

/// Full description of one caption layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    /// Caption text; may contain newlines
    pub text: String,
    /// Font family name or path to a font file
    #[serde(default = "default_font")]
    pub font: String,
    #[serde(default = "default_text_font_size")]
    pub font_size: u32,
    /// `#RRGGBB`, `#RGB`, `0xRRGGBB` or a basic color name
    #[serde(default = "default_text_color")]
    pub color: String,
    #[serde(default)]
    pub position: TextPosition,
    #[serde(default)]
    pub x_offset: i64,
    #[serde(default)]
    pub y_offset: i64,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

fn default_font() -> String {
    DEFAULT_OVERLAY_FONT.to_string()
}
fn default_text_font_size() -> u32 {
    DEFAULT_TEXT_FONT_SIZE
}
fn default_text_color() -> String {
    "white".to_string()
}
fn default_opacity() -> f32 {
    1.0
}
fn default_watermark_font_size() -> u32 {
    DEFAULT_WATERMARK_FONT_SIZE
}
fn default_watermark_opacity() -> f32 {
    DEFAULT_WATERMARK_OPACITY
}

impl OverlayStyle {
    /// Create a caption with default styling (top-center, white, 40px).
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: default_font(),
            font_size: DEFAULT_TEXT_FONT_SIZE,
            color: default_text_color(),
            position: TextPosition::Top,
            x_offset: 0,
            y_offset: 0,
            opacity: 1.0,
        }
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        self
    }

    pub fn with_font_size(mut self, size: u32) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_position(mut self, position: TextPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_offsets(mut self, x: i64, y: i64) -> Self {
        self.x_offset = x;
        self.y_offset = y;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}

/// Semi-transparent watermark text pinned to the left edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkStyle {
    pub text: String,
    #[serde(default = "default_watermark_opacity")]
    pub opacity: f32,
    #[serde(default = "default_watermark_font_size")]
    pub font_size: u32,
    #[serde(default = "default_font")]
    pub font: String,
}

impl WatermarkStyle {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            opacity: DEFAULT_WATERMARK_OPACITY,
            font_size: DEFAULT_WATERMARK_FONT_SIZE,
            font: default_font(),
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_font_size(mut self, size: u32) -> Self {
        self.font_size = size;
        self
    }
}
