//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

use stackcut_models::ParameterError;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while compositing a job.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Failed to open media {path}: {message}")]
    MediaOpen { path: PathBuf, message: String },

    #[error("Overlay rendering failed: {0}")]
    OverlayRender(String),

    #[error("Audio mixing failed: {0}")]
    AudioMix(String),

    #[error("Encoding failed: {message}")]
    Encode {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Create a media open error.
    pub fn open_failed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::MediaOpen {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an overlay rendering error.
    pub fn overlay(message: impl Into<String>) -> Self {
        Self::OverlayRender(message.into())
    }

    /// Create an audio mixing error.
    pub fn audio_mix(message: impl Into<String>) -> Self {
        Self::AudioMix(message.into())
    }

    /// Create an encoding failure error.
    pub fn encode_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::Encode {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            MediaError::InvalidConfiguration(_) => "invalid_configuration",
            MediaError::MediaOpen { .. } => "media_open",
            MediaError::OverlayRender(_) => "overlay_render",
            MediaError::AudioMix(_) => "audio_mix",
            MediaError::Encode { .. } => "encode",
            MediaError::Io(_) => "io",
        }
    }
}

impl From<ParameterError> for MediaError {
    fn from(err: ParameterError) -> Self {
        Self::InvalidConfiguration(err.to_string())
    }
}
