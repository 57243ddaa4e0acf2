//! Upload form parsing.
//!
//! Text fields of the multipart form are collected into a map and turned
//! into [`JobParameters`]; omitted fields take the [`UploadDefaults`].

use std::collections::HashMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use stackcut_models::{AspectRatio, JobParameters, TextPosition, UploadDefaults};

use crate::error::{ApiError, ApiResult};

/// Saved upload files for one request.
#[derive(Debug, Clone, Default)]
pub struct UploadedFiles {
    pub video1: Option<PathBuf>,
    pub video2: Option<PathBuf>,
    pub background_music: Option<PathBuf>,
}

/// Build job parameters from form fields.
pub fn job_parameters(
    fields: &HashMap<String, String>,
    defaults: &UploadDefaults,
    primary: &Path,
    secondary: &Path,
    background_music: Option<&Path>,
    output: &Path,
) -> ApiResult<JobParameters> {
    let aspect_ratio: AspectRatio = parse_field(fields, "aspect_ratio", defaults.aspect_ratio)?;
    let target_resolution: u32 =
        parse_field(fields, "target_resolution", defaults.target_resolution)?;
    let video1_offset: i64 = parse_field(fields, "video1_offset", defaults.video1_offset)?;
    let video2_offset: i64 = parse_field(fields, "video2_offset", defaults.video2_offset)?;
    let watermark_opacity: f32 =
        parse_field(fields, "watermark_opacity", defaults.watermark_opacity)?;
    let bg_music_volume: f32 = parse_field(fields, "bg_music_volume", defaults.bg_music_volume)?;
    let text_fontsize: u32 = parse_field(fields, "text_fontsize", defaults.text_fontsize)?;
    let text_x_offset: i64 = parse_field(fields, "text_x_offset", 0)?;
    let text_y_offset: i64 = parse_field(fields, "text_y_offset", 0)?;
    let text_opacity: f32 = parse_field(fields, "text_opacity", 1.0)?;
    let text_position = fields
        .get("text_position")
        .map(|raw| raw.parse::<TextPosition>().unwrap_or_else(|never| match never {}))
        .unwrap_or_else(|| defaults.text_position.clone());

    let mut watermark = defaults.watermark_style().with_opacity(watermark_opacity);
    if let Some(text) = fields.get("watermark") {
        watermark.text = text.clone();
    }

    let mut caption = defaults
        .text_style()
        .with_font_size(text_fontsize)
        .with_position(text_position)
        .with_offsets(text_x_offset, text_y_offset)
        .with_opacity(text_opacity);
    if let Some(text) = fields.get("text_overlay") {
        caption.text = text.clone();
    }
    if let Some(color) = fields.get("text_color") {
        caption.color = color.clone();
    }
    if let Some(font) = fields.get("text_font") {
        caption.font = font.clone();
    }

    let mut builder = JobParameters::builder(primary, secondary, output)
        .target_resolution(target_resolution)
        .aspect_ratio(aspect_ratio)
        .offsets(video1_offset, video2_offset)
        .watermark(watermark)
        .text_overlay(caption)
        .bg_music_volume(bg_music_volume);
    if let Some(music) = background_music {
        builder = builder.background_music(music, bg_music_volume);
    }

    builder
        .build()
        .map_err(|e| ApiError::invalid_input(e.to_string()))
}

/// Parse a form field, falling back to `default` when it is absent.
fn parse_field<T>(fields: &HashMap<String, String>, name: &str, default: T) -> ApiResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    match fields.get(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ApiError::invalid_input(format!("{}: {}", name, e))),
    }
}

/// File name for an upload: `<uuid>.<ext>`, keeping the client's extension.
pub fn unique_file_name(original: Option<&str>, fallback_ext: &str) -> String {
    let ext = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| fallback_ext.to_string());
    format!("{}.{}", uuid::Uuid::new_v4(), ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackcut_models::Rgb;

    fn build(fields: &[(&str, &str)]) -> ApiResult<JobParameters> {
        let fields: HashMap<String, String> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        job_parameters(
            &fields,
            &UploadDefaults::default(),
            Path::new("in/a.mp4"),
            Path::new("in/b.mp4"),
            None,
            Path::new("out/c.mp4"),
        )
    }

    #[test]
    fn test_defaults_applied() {
        let params = build(&[]).unwrap();
        assert_eq!(params.target_resolution, 1024);
        assert_eq!(params.aspect_ratio, AspectRatio::LANDSCAPE);
        assert_eq!((params.video1_offset, params.video2_offset), (30, 30));
        assert!((params.bg_music_volume - 0.2).abs() < f32::EPSILON);
        assert_eq!(params.background_color, Rgb::BLACK);

        let watermark = params.watermark.unwrap();
        assert!((watermark.opacity - 0.6).abs() < f32::EPSILON);

        let caption = params.text_overlay.unwrap();
        assert_eq!(caption.position, TextPosition::Bottom);
        assert_eq!(caption.font, "Impact");
        assert_eq!(caption.font_size, 50);
        assert_eq!(caption.color, "#FFD700");
        assert_eq!(caption.text, "Follow for more!\nLike & Subscribe");
        assert!(params.background_music_path.is_none());
    }

    #[test]
    fn test_fields_override_defaults() {
        let params = build(&[
            ("aspect_ratio", "9:16"),
            ("target_resolution", "1080"),
            ("video1_offset", "12"),
            ("video2_offset", "-4"),
            ("watermark", "@me"),
            ("text_overlay", "Hi"),
            ("text_position", "100,200"),
            ("text_x_offset", "5"),
            ("text_color", "red"),
            ("text_opacity", "0.5"),
        ])
        .unwrap();
        assert_eq!(params.aspect_ratio, AspectRatio::PORTRAIT);
        assert_eq!(params.target_resolution, 1080);
        assert_eq!((params.video1_offset, params.video2_offset), (12, -4));
        assert_eq!(params.watermark.unwrap().text, "@me");

        let caption = params.text_overlay.unwrap();
        assert_eq!(caption.text, "Hi");
        assert_eq!(caption.position, TextPosition::At { x: 100, y: 200 });
        assert_eq!(caption.x_offset, 5);
        assert_eq!(caption.color, "red");
    }

    #[test]
    fn test_unparseable_number_is_invalid_input() {
        let err = build(&[("target_resolution", "big")]).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert!(err.to_string().starts_with("Invalid input value: target_resolution"));
    }

    #[test]
    fn test_bad_aspect_ratio_is_invalid_input() {
        assert!(matches!(
            build(&[("aspect_ratio", "wide")]),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            build(&[("aspect_ratio", "0:9")]),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_out_of_range_opacity_is_invalid_input() {
        assert!(matches!(
            build(&[("watermark_opacity", "1.5")]),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unique_file_name() {
        let name = unique_file_name(Some("clip.MOV"), "bin");
        assert!(name.ends_with(".mov"));
        assert_eq!(name.len(), 36 + 4);
        assert!(unique_file_name(Some("noext"), "bin").ends_with(".bin"));
        assert!(unique_file_name(Some("../../x.m p4"), "bin").ends_with(".bin"));
        assert_ne!(unique_file_name(None, "mp4"), unique_file_name(None, "mp4"));
    }
}
