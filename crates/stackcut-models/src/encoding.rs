//! Output encoding profile.

use serde::{Deserialize, Serialize};

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default encoding preset
pub const DEFAULT_PRESET: &str = "faster";
/// Default video bitrate
pub const DEFAULT_VIDEO_BITRATE: &str = "8000k";
/// Default encoder thread count
pub const DEFAULT_THREADS: u32 = 4;

/// Fixed-quality encoding profile for the composited output.
///
/// The frame rate is not part of the profile: it always follows the
/// primary source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingProfile {
    /// Video codec (e.g., "libx264")
    #[serde(default = "default_video_codec")]
    pub codec: String,

    /// Encoding preset (e.g., "faster", "medium")
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Target video bitrate
    #[serde(default = "default_video_bitrate")]
    pub video_bitrate: String,

    /// Audio codec
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Encoder threads
    #[serde(default = "default_threads")]
    pub threads: u32,

    /// Additional FFmpeg output arguments
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}
fn default_video_bitrate() -> String {
    DEFAULT_VIDEO_BITRATE.to_string()
}
fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}
fn default_threads() -> u32 {
    DEFAULT_THREADS
}

impl Default for EncodingProfile {
    fn default() -> Self {
        Self {
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: DEFAULT_PRESET.to_string(),
            video_bitrate: DEFAULT_VIDEO_BITRATE.to_string(),
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            threads: DEFAULT_THREADS,
            extra_args: Vec::new(),
        }
    }
}

impl EncodingProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert to FFmpeg output arguments for a `width x height` stream at `fps`.
    ///
    /// 4:2:0 chroma subsampling needs even dimensions, so `yuv420p` is only
    /// requested when both sides are even; odd canvases are encoded as `yuv444p`.
    pub fn to_ffmpeg_args(&self, width: u32, height: u32, fps: f64) -> Vec<String> {
        let mut args = vec![
            "-c:v".to_string(),
            self.codec.clone(),
            "-preset".to_string(),
            self.preset.clone(),
            "-b:v".to_string(),
            self.video_bitrate.clone(),
            "-r".to_string(),
            format_fps(fps),
        ];

        if self.codec == DEFAULT_VIDEO_CODEC {
            args.extend_from_slice(&[
                "-pix_fmt".to_string(),
                pixel_format(width, height).to_string(),
            ]);
        }

        args.extend_from_slice(&[
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-threads".to_string(),
            self.threads.to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
        ]);

        args.extend(self.extra_args.clone());

        args
    }
}

/// Pixel format for a `width x height` x264 stream.
fn pixel_format(width: u32, height: u32) -> &'static str {
    if width % 2 == 0 && height % 2 == 0 {
        "yuv420p"
    } else {
        "yuv444p"
    }
}

/// Format a frame rate without trailing noise (`30`, `29.97`).
pub fn format_fps(fps: f64) -> String {
    let formatted = format!("{:.3}", fps);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
