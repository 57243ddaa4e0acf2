//! Media engine seam.
//!
//! The compositor only talks to a [`MediaBackend`]: it opens sources, hands
//! over one compiled command for the final encode, and releases every handle
//! it opened. [`FfmpegBackend`] drives the `ffprobe`/`ffmpeg` executables.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{debug, info};

use crate::clip::{AudioTrack, ClipHandle, HandleId};
use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::{probe_audio, probe_video};

/// Opens, encodes and releases media for the compositor.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Open a video source.
    async fn open_video(&self, path: &Path) -> MediaResult<ClipHandle>;

    /// Open an audio-only source.
    async fn open_audio(&self, path: &Path) -> MediaResult<AudioTrack>;

    /// Run the final encode. `expected_duration` is the output length in seconds.
    async fn encode(&self, command: &FfmpegCommand, expected_duration: f64) -> MediaResult<()>;

    /// Release an opened source. Called exactly once per opened handle.
    fn release(&self, _handle: HandleId) -> MediaResult<()> {
        Ok(())
    }
}

/// Production backend over the FFmpeg CLI.
#[derive(Debug, Default)]
pub struct FfmpegBackend {
    next_id: AtomicU64,
    open: Mutex<HashSet<HandleId>>,
}

impl FfmpegBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self) -> HandleId {
        let id = HandleId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        if let Ok(mut open) = self.open.lock() {
            open.insert(id);
        }
        id
    }

    /// Number of handles opened and not yet released.
    pub fn open_handles(&self) -> usize {
        self.open.lock().map(|open| open.len()).unwrap_or(0)
    }
}

#[async_trait]
impl MediaBackend for FfmpegBackend {
    async fn open_video(&self, path: &Path) -> MediaResult<ClipHandle> {
        let info = probe_video(path).await?;
        let id = self.register();
        debug!(
            handle = %id,
            path = %path.display(),
            width = info.width,
            height = info.height,
            duration = info.duration,
            fps = info.fps,
            has_audio = info.has_audio(),
            "Opened video"
        );
        Ok(ClipHandle::open(id, path, &info))
    }

    async fn open_audio(&self, path: &Path) -> MediaResult<AudioTrack> {
        let info = probe_audio(path).await?;
        let id = self.register();
        debug!(
            handle = %id,
            path = %path.display(),
            duration = info.duration,
            "Opened audio"
        );
        Ok(AudioTrack::open(id, path, &info))
    }

    async fn encode(&self, command: &FfmpegCommand, expected_duration: f64) -> MediaResult<()> {
        info!(
            output = %command.output().display(),
            inputs = command.inputs().len(),
            duration = expected_duration,
            "Encoding composite"
        );
        FfmpegRunner::new()
            .with_expected_duration(expected_duration)
            .run(command)
            .await
    }

    fn release(&self, handle: HandleId) -> MediaResult<()> {
        let mut open = self
            .open
            .lock()
            .map_err(|_| MediaError::invalid_config("Handle registry poisoned"))?;
        if open.remove(&handle) {
            debug!(handle = %handle, "Released media handle");
            Ok(())
        } else {
            Err(MediaError::invalid_config(format!(
                "Handle {} is not open",
                handle
            )))
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_unknown_handle_fails() {
        let backend = FfmpegBackend::new();
        assert!(backend.release(HandleId(42)).is_err());
    }

    #[test]
    fn test_register_and_release() {
        let backend = FfmpegBackend::new();
        let a = backend.register();
        let b = backend.register();
        assert_ne!(a, b);
        assert_eq!(backend.open_handles(), 2);
        backend.release(a).unwrap();
        assert_eq!(backend.open_handles(), 1);
        assert!(backend.release(a).is_err());
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let backend = FfmpegBackend::new();
        let err = backend
            .open_video(Path::new("/nonexistent/clip.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::MediaOpen { .. }));
        assert_eq!(backend.open_handles(), 0);
    }
}
