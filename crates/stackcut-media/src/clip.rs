//! Clip handles: opened sources plus pending transforms.
//!
//! A handle never holds decoded frames. Each stage takes a handle by value
//! and returns a new one with updated geometry/duration and one more
//! transform appended; the compositor compiles the final transform chains
//! into a single FFmpeg filter graph.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{MediaError, MediaResult};
use crate::probe::{AudioInfo, VideoInfo};

/// Identity of one opened source, shared by every handle derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A video transform applied, in order, to every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VideoOp {
    Crop {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    Scale {
        width: u32,
        height: u32,
    },
    /// Keep `[0, duration]`
    Trim { duration: f64 },
}

/// An audio transform applied in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AudioOp {
    /// Keep exactly `[0, duration]`, padding with silence if the source ends early
    Trim { duration: f64 },
    /// Amplitude multiplier
    Volume(f32),
}

/// An audio stream taken from a source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioTrack {
    source: HandleId,
    path: PathBuf,
    duration: f64,
    /// Times the source is played back to back
    repeats: u32,
    ops: Vec<AudioOp>,
}

impl AudioTrack {
    /// Audio track of an opened source.
    pub fn open(source: HandleId, path: impl Into<PathBuf>, info: &AudioInfo) -> Self {
        Self::from_parts(source, path, info.duration)
    }

    pub(crate) fn from_parts(source: HandleId, path: impl Into<PathBuf>, duration: f64) -> Self {
        Self {
            source,
            path: path.into(),
            duration,
            repeats: 1,
            ops: Vec::new(),
        }
    }

    pub fn source(&self) -> HandleId {
        self.source
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn repeats(&self) -> u32 {
        self.repeats
    }

    pub fn ops(&self) -> &[AudioOp] {
        &self.ops
    }

    /// Play the source `repeats` times back to back.
    pub fn looped(mut self, repeats: u32) -> MediaResult<Self> {
        if repeats == 0 {
            return Err(MediaError::invalid_config("Loop count must be positive"));
        }
        if !self.ops.is_empty() {
            return Err(MediaError::invalid_config(
                "Audio can only be looped before other transforms",
            ));
        }
        self.repeats *= repeats;
        self.duration *= f64::from(repeats);
        Ok(self)
    }

    /// Cut (or pad) to exactly `duration` seconds.
    pub fn trimmed(mut self, duration: f64) -> Self {
        self.ops.push(AudioOp::Trim { duration });
        self.duration = duration;
        self
    }

    /// Scale amplitude.
    pub fn with_volume(mut self, factor: f32) -> Self {
        self.ops.push(AudioOp::Volume(factor));
        self
    }

    /// Product of every volume transform.
    pub fn gain(&self) -> f32 {
        self.ops
            .iter()
            .filter_map(|op| match op {
                AudioOp::Volume(v) => Some(*v),
                _ => None,
            })
            .product()
    }
}

/// An opened video source with its current logical shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipHandle {
    source: HandleId,
    path: PathBuf,
    width: u32,
    height: u32,
    duration: f64,
    fps: f64,
    repeats: u32,
    ops: Vec<VideoOp>,
    audio: Option<AudioTrack>,
}

impl ClipHandle {
    /// Handle for a freshly opened source.
    pub fn open(source: HandleId, path: impl Into<PathBuf>, info: &VideoInfo) -> Self {
        let path = path.into();
        let audio = info
            .audio_duration
            .map(|duration| AudioTrack::from_parts(source, path.clone(), duration));
        Self {
            source,
            path,
            width: info.width,
            height: info.height,
            duration: info.duration,
            fps: info.fps,
            repeats: 1,
            ops: Vec::new(),
            audio,
        }
    }

    pub fn source(&self) -> HandleId {
        self.source
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn repeats(&self) -> u32 {
        self.repeats
    }

    pub fn ops(&self) -> &[VideoOp] {
        &self.ops
    }

    pub fn audio(&self) -> Option<&AudioTrack> {
        self.audio.as_ref()
    }

    /// Take the audio track, leaving the handle silent.
    pub fn take_audio(&mut self) -> Option<AudioTrack> {
        self.audio.take()
    }

    /// Keep the `width x height` region whose top-left corner is `(x, y)`.
    pub fn cropped(mut self, x: u32, y: u32, width: u32, height: u32) -> MediaResult<Self> {
        let fits = width > 0
            && height > 0
            && u64::from(x) + u64::from(width) <= u64::from(self.width)
            && u64::from(y) + u64::from(height) <= u64::from(self.height);
        if !fits {
            return Err(MediaError::invalid_config(format!(
                "Crop {}x{}+{}+{} outside {}x{} frame",
                width, height, x, y, self.width, self.height
            )));
        }
        self.ops.push(VideoOp::Crop {
            x,
            y,
            width,
            height,
        });
        self.width = width;
        self.height = height;
        Ok(self)
    }

    /// Resample every frame to `width x height`.
    pub fn resized(mut self, width: u32, height: u32) -> MediaResult<Self> {
        if width == 0 || height == 0 {
            return Err(MediaError::invalid_config(format!(
                "Cannot resize to {}x{}",
                width, height
            )));
        }
        self.ops.push(VideoOp::Scale { width, height });
        self.width = width;
        self.height = height;
        Ok(self)
    }

    /// Play the clip `repeats` times back to back, each copy from frame 0.
    pub fn looped(mut self, repeats: u32) -> MediaResult<Self> {
        if repeats == 0 {
            return Err(MediaError::invalid_config("Loop count must be positive"));
        }
        if self.ops.iter().any(|op| matches!(op, VideoOp::Trim { .. })) {
            return Err(MediaError::invalid_config(
                "A trimmed clip cannot be looped",
            ));
        }
        self.repeats *= repeats;
        self.duration *= f64::from(repeats);
        self.audio = match self.audio.take() {
            Some(track) => Some(track.looped(repeats)?),
            None => None,
        };
        Ok(self)
    }

    /// Keep `[0, duration]`.
    pub fn trimmed(mut self, duration: f64) -> MediaResult<Self> {
        if !(duration.is_finite() && duration > 0.0) {
            return Err(MediaError::invalid_config(format!(
                "Trim duration must be positive, got {}",
                duration
            )));
        }
        self.ops.push(VideoOp::Trim { duration });
        self.duration = duration;
        self.audio = self.audio.take().map(|track| track.trimmed(duration));
        Ok(self)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::clip;
    use super::*;

    #[test]
    fn test_open_carries_audio() {
        let handle = clip(1920, 1080, 5.0);
        assert_eq!(handle.size(), (1920, 1080));
        assert_eq!(handle.audio().unwrap().duration(), 5.0);
        assert_eq!(handle.audio().unwrap().source(), HandleId(1));
    }

    #[test]
    fn test_crop_out_of_bounds_rejected() {
        assert!(clip(100, 100, 1.0).cropped(50, 0, 60, 100).is_err());
        assert!(clip(100, 100, 1.0).cropped(0, 0, 0, 100).is_err());
        assert!(clip(100, 100, 1.0).cropped(40, 0, 60, 100).is_ok());
    }

    #[test]
    fn test_loop_then_trim() {
        let handle = clip(100, 100, 2.0).looped(4).unwrap().trimmed(7.0).unwrap();
        assert_eq!(handle.repeats(), 4);
        assert_eq!(handle.duration(), 7.0);
        assert_eq!(handle.audio().unwrap().repeats(), 4);
        assert_eq!(handle.audio().unwrap().duration(), 7.0);
    }

    #[test]
    fn test_trimmed_clip_cannot_loop() {
        let handle = clip(100, 100, 2.0).trimmed(1.0).unwrap();
        assert!(matches!(
            handle.looped(2),
            Err(MediaError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_audio_gain_multiplies() {
        let mut handle = clip(100, 100, 2.0);
        let track = handle.take_audio().unwrap().with_volume(0.5).with_volume(0.4);
        assert!((track.gain() - 0.2).abs() < 1e-6);
        assert!(handle.audio().is_none());
    }
}
