//! Job parameters for one composition run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::{AspectRatio, OverlayStyle, Rgb, WatermarkStyle};

/// Default output height in pixels.
pub const DEFAULT_TARGET_RESOLUTION: u32 = 1080;
/// Default vertical offset for both videos.
pub const DEFAULT_VIDEO_OFFSET: i64 = 34;
/// Default background music volume multiplier.
pub const DEFAULT_BG_MUSIC_VOLUME: f32 = 0.3;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised while validating job parameters.
#[derive(Debug, Error, PartialEq)]
pub enum ParameterError {
    #[error("Target resolution must be positive")]
    NonPositiveResolution,

    #[error("Aspect ratio components must be positive, got {0}")]
    InvalidAspectRatio(AspectRatio),

    #[error("Watermark opacity must be within 0.0..=1.0, got {0}")]
    WatermarkOpacity(f32),

    #[error("Background music volume must be finite and non-negative, got {0}")]
    MusicVolume(f32),

    #[error("{0} path is empty")]
    EmptyPath(&'static str),
}

/// The full configuration bundle for one job.
///
/// Immutable once built; validated once at pipeline entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobParameters {
    /// Reference clip: its audio and duration drive the output
    pub primary_path: PathBuf,
    /// Companion clip, looped or trimmed to the primary duration
    pub secondary_path: PathBuf,
    pub output_path: PathBuf,
    /// Output height in pixels
    pub target_resolution: u32,
    pub aspect_ratio: AspectRatio,
    pub watermark: Option<WatermarkStyle>,
    pub text_overlay: Option<OverlayStyle>,
    pub background_music_path: Option<PathBuf>,
    /// Background music amplitude multiplier (nominally 0.0..=1.0, not clamped)
    pub bg_music_volume: f32,
    /// Distance of the primary clip from the top edge
    pub video1_offset: i64,
    /// Pull-up of the secondary clip from the canvas midline
    pub video2_offset: i64,
    pub background_color: Rgb,
}

impl JobParameters {
    /// Start building parameters for the given sources and output.
    pub fn builder(
        primary_path: impl Into<PathBuf>,
        secondary_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> JobParametersBuilder {
        JobParametersBuilder {
            params: JobParameters {
                primary_path: primary_path.into(),
                secondary_path: secondary_path.into(),
                output_path: output_path.into(),
                target_resolution: DEFAULT_TARGET_RESOLUTION,
                aspect_ratio: AspectRatio::PORTRAIT,
                watermark: None,
                text_overlay: None,
                background_music_path: None,
                bg_music_volume: DEFAULT_BG_MUSIC_VOLUME,
                video1_offset: DEFAULT_VIDEO_OFFSET,
                video2_offset: DEFAULT_VIDEO_OFFSET,
                background_color: Rgb::BLACK,
            },
        }
    }

    /// Validate the parameter bundle.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.target_resolution == 0 {
            return Err(ParameterError::NonPositiveResolution);
        }
        if !self.aspect_ratio.is_valid() {
            return Err(ParameterError::InvalidAspectRatio(self.aspect_ratio));
        }
        if let Some(wm) = &self.watermark {
            if !(0.0..=1.0).contains(&wm.opacity) {
                return Err(ParameterError::WatermarkOpacity(wm.opacity));
            }
        }
        if self.background_music_path.is_some()
            && (!self.bg_music_volume.is_finite() || self.bg_music_volume < 0.0)
        {
            return Err(ParameterError::MusicVolume(self.bg_music_volume));
        }
        for (label, path) in [
            ("Primary video", &self.primary_path),
            ("Secondary video", &self.secondary_path),
            ("Output", &self.output_path),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ParameterError::EmptyPath(label));
            }
        }
        Ok(())
    }

    /// Watermark to render, if any non-empty text was requested.
    pub fn active_watermark(&self) -> Option<&WatermarkStyle> {
        self.watermark.as_ref().filter(|wm| !wm.text.is_empty())
    }

    /// Caption to render, if any non-empty text was requested.
    pub fn active_text_overlay(&self) -> Option<&OverlayStyle> {
        self.text_overlay.as_ref().filter(|style| !style.text.is_empty())
    }

    /// Background music path, only if set and present on disk.
    ///
    /// A missing file is treated the same as no music requested.
    pub fn existing_background_music(&self) -> Option<&Path> {
        self.background_music_path
            .as_deref()
            .filter(|path| path.exists())
    }
}

/// Builder for [`JobParameters`].
#[derive(Debug, Clone)]
pub struct JobParametersBuilder {
    params: JobParameters,
}

impl JobParametersBuilder {
    pub fn target_resolution(mut self, height: u32) -> Self {
        self.params.target_resolution = height;
        self
    }

    pub fn aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.params.aspect_ratio = ratio;
        self
    }

    pub fn watermark(mut self, watermark: WatermarkStyle) -> Self {
        self.params.watermark = Some(watermark);
        self
    }

    pub fn text_overlay(mut self, style: OverlayStyle) -> Self {
        self.params.text_overlay = Some(style);
        self
    }

    pub fn background_music(mut self, path: impl Into<PathBuf>, volume: f32) -> Self {
        self.params.background_music_path = Some(path.into());
        self.params.bg_music_volume = volume;
        self
    }

    pub fn bg_music_volume(mut self, volume: f32) -> Self {
        self.params.bg_music_volume = volume;
        self
    }

    pub fn offsets(mut self, video1_offset: i64, video2_offset: i64) -> Self {
        self.params.video1_offset = video1_offset;
        self.params.video2_offset = video2_offset;
        self
    }

    pub fn background_color(mut self, color: Rgb) -> Self {
        self.params.background_color = color;
        self
    }

    /// Finish building, validating the bundle.
    pub fn build(self) -> Result<JobParameters, ParameterError> {
        self.params.validate()?;
        Ok(self.params)
    }

    /// Finish building without validation; the pipeline validates at entry.
    pub fn build_unchecked(self) -> JobParameters {
        self.params
    }
}
