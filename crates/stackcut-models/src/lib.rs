//! Shared data models for the stackcut compositor.
//!
//! This crate provides Serde-serializable types for:
//! - Job parameters and their validation
//! - Aspect ratios and colors
//! - Text overlay and watermark styles
//! - The fixed output encoding profile

pub mod aspect;
pub mod color;
pub mod defaults;
pub mod encoding;
pub mod job;
pub mod overlay;

// Re-export common types
pub use aspect::{AspectRatio, AspectRatioParseError};
pub use color::{ColorParseError, Rgb};
pub use defaults::UploadDefaults;
pub use encoding::{format_fps, EncodingProfile};
pub use job::{
    JobId, JobParameters, JobParametersBuilder, ParameterError, DEFAULT_BG_MUSIC_VOLUME,
    DEFAULT_TARGET_RESOLUTION, DEFAULT_VIDEO_OFFSET,
};
pub use overlay::{
    OverlayStyle, TextPosition, WatermarkStyle, DEFAULT_OVERLAY_FONT, DEFAULT_TEXT_FONT_SIZE,
    DEFAULT_WATERMARK_FONT_SIZE, DEFAULT_WATERMARK_OPACITY,
};
