//! FFprobe media information.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::command::check_ffprobe;
use crate::error::{MediaError, MediaResult};

/// Frame rate assumed when a stream does not report one.
const DEFAULT_FPS: f64 = 30.0;

/// Video file information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate (fps)
    pub fps: f64,
    /// Video codec
    pub codec: String,
    /// Audio stream duration, if the file carries audio
    pub audio_duration: Option<f64>,
}

impl VideoInfo {
    pub fn has_audio(&self) -> bool {
        self.audio_duration.is_some()
    }
}

/// Audio file information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioInfo {
    /// Duration in seconds
    pub duration: f64,
    pub codec: String,
    pub sample_rate: Option<u32>,
    pub channels: Option<u32>,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u32>,
}

/// Probe a video file; fails with `MediaOpen` if it is missing or undecodable.
pub async fn probe_video(path: impl AsRef<Path>) -> MediaResult<VideoInfo> {
    let path = path.as_ref();
    let probe = run_ffprobe(path).await?;
    video_info_from_probe(path, &probe)
}

/// Probe an audio asset; fails with `MediaOpen` if it has no usable audio stream.
pub async fn probe_audio(path: impl AsRef<Path>) -> MediaResult<AudioInfo> {
    let path = path.as_ref();
    let probe = run_ffprobe(path).await?;
    audio_info_from_probe(path, &probe)
}

async fn run_ffprobe(path: &Path) -> MediaResult<FfprobeOutput> {
    if !path.exists() {
        return Err(MediaError::open_failed(path, "File not found"));
    }

    let ffprobe = check_ffprobe()
        .ok_or_else(|| MediaError::open_failed(path, "FFprobe not found in PATH"))?;

    let output = Command::new(ffprobe)
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| MediaError::open_failed(path, format!("Failed to spawn FFprobe: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MediaError::open_failed(
            path,
            format!("FFprobe failed: {}", stderr.trim()),
        ));
    }

    parse_probe_json(path, &output.stdout)
}

fn parse_probe_json(path: &Path, json: &[u8]) -> MediaResult<FfprobeOutput> {
    serde_json::from_slice(json)
        .map_err(|e| MediaError::open_failed(path, format!("Unreadable FFprobe output: {}", e)))
}

fn video_info_from_probe(path: &Path, probe: &FfprobeOutput) -> MediaResult<VideoInfo> {
    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| MediaError::open_failed(path, "No video stream found"))?;

    let width = video_stream.width.unwrap_or(0);
    let height = video_stream.height.unwrap_or(0);
    if width == 0 || height == 0 {
        return Err(MediaError::open_failed(path, "Video stream has no dimensions"));
    }

    let duration = parse_seconds(probe.format.duration.as_deref())
        .or_else(|| parse_seconds(video_stream.duration.as_deref()))
        .filter(|d| *d > 0.0)
        .ok_or_else(|| MediaError::open_failed(path, "Video has no positive duration"))?;

    let fps = video_stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .or_else(|| video_stream.r_frame_rate.as_deref().and_then(parse_frame_rate))
        .unwrap_or(DEFAULT_FPS);

    let audio_duration = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "audio")
        .map(|s| parse_seconds(s.duration.as_deref()).unwrap_or(duration));

    Ok(VideoInfo {
        duration,
        width,
        height,
        fps,
        codec: video_stream.codec_name.clone().unwrap_or_default(),
        audio_duration,
    })
}

fn audio_info_from_probe(path: &Path, probe: &FfprobeOutput) -> MediaResult<AudioInfo> {
    let audio_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "audio")
        .ok_or_else(|| MediaError::open_failed(path, "No audio stream found"))?;

    let duration = parse_seconds(audio_stream.duration.as_deref())
        .or_else(|| parse_seconds(probe.format.duration.as_deref()))
        .filter(|d| *d > 0.0)
        .ok_or_else(|| MediaError::open_failed(path, "Audio has no positive duration"))?;

    Ok(AudioInfo {
        duration,
        codec: audio_stream.codec_name.clone().unwrap_or_default(),
        sample_rate: audio_stream
            .sample_rate
            .as_deref()
            .and_then(|s| s.parse().ok()),
        channels: audio_stream.channels,
    })
}

fn parse_seconds(value: Option<&str>) -> Option<f64> {
    value.and_then(|v| v.parse::<f64>().ok()).filter(|v| v.is_finite())
}

/// Parse frame rate string (e.g., "30/1" or "29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 && num > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    s.parse().ok().filter(|fps: &f64| *fps > 0.0)
}
