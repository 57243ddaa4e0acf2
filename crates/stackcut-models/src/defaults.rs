//! Parameter defaults applied at the upload boundary.

use crate::{AspectRatio, OverlayStyle, TextPosition, WatermarkStyle};

/// Defaults used by the HTTP upload endpoint when a field is omitted.
///
/// These differ from the library defaults on [`crate::JobParameters`]:
/// uploads produce landscape output with a caption at the bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadDefaults {
    pub video1_offset: i64,
    pub video2_offset: i64,
    pub target_resolution: u32,
    pub watermark: String,
    pub watermark_opacity: f32,
    pub bg_music_volume: f32,
    pub text_overlay: String,
    pub text_color: String,
    pub text_position: TextPosition,
    pub text_fontsize: u32,
    pub text_font: String,
    pub aspect_ratio: AspectRatio,
}

impl Default for UploadDefaults {
    fn default() -> Self {
        Self {
            video1_offset: 30,
            video2_offset: 30,
            target_resolution: 1024,
            watermark: "@stackcut".to_string(),
            watermark_opacity: 0.6,
            bg_music_volume: 0.2,
            text_overlay: "Follow for more!\nLike & Subscribe".to_string(),
            text_color: "#FFD700".to_string(),
            text_position: TextPosition::Bottom,
            text_fontsize: 50,
            text_font: "Impact".to_string(),
            aspect_ratio: AspectRatio::LANDSCAPE,
        }
    }
}

impl UploadDefaults {
    /// Watermark style built from the defaults.
    pub fn watermark_style(&self) -> WatermarkStyle {
        WatermarkStyle::new(self.watermark.clone()).with_opacity(self.watermark_opacity)
    }

    /// Caption style built from the defaults.
    pub fn text_style(&self) -> OverlayStyle {
        OverlayStyle::new(self.text_overlay.clone())
            .with_font(self.text_font.clone())
            .with_font_size(self.text_fontsize)
            .with_color(self.text_color.clone())
            .with_position(self.text_position.clone())
    }
}
