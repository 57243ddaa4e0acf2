//! Background music mixing.
//!
//! The mixer prepares parallel tracks; summing them into one stream happens
//! in the compiled filter graph.

use std::path::Path;
use tracing::{info, warn};

use crate::backend::MediaBackend;
use crate::clip::AudioTrack;
use crate::error::{MediaError, MediaResult};
use crate::metrics;
use crate::reconcile::reconcile_audio;
use crate::resources::JobResources;

/// Ordered audio tracks to be summed into the output track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioTrackSet {
    tracks: Vec<AudioTrack>,
    degraded: bool,
}

impl AudioTrackSet {
    /// The primary clip's own audio, unmodified (empty for silent sources).
    pub fn primary_only(primary: Option<AudioTrack>) -> Self {
        Self {
            tracks: primary.into_iter().collect(),
            degraded: false,
        }
    }

    /// Tracks summed as given.
    pub fn from_tracks(tracks: Vec<AudioTrack>) -> Self {
        Self {
            tracks,
            degraded: false,
        }
    }

    fn degraded(primary: Option<AudioTrack>) -> Self {
        Self {
            degraded: true,
            ..Self::primary_only(primary)
        }
    }

    pub fn tracks(&self) -> &[AudioTrack] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Whether background music was requested but could not be mixed.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

/// Loops, trims and scales background music against the primary audio.
pub struct AudioMixer<'a> {
    backend: &'a dyn MediaBackend,
}

impl<'a> AudioMixer<'a> {
    pub fn new(backend: &'a dyn MediaBackend) -> Self {
        Self { backend }
    }

    /// Prepare `[primary, music]` for a `target`-second output.
    ///
    /// Never fails: if the music cannot be opened or reconciled, the set
    /// holds only the primary audio, unmodified, and is marked degraded.
    pub async fn mix(
        &self,
        primary: Option<AudioTrack>,
        music_path: &Path,
        target: f64,
        volume: f32,
        resources: &mut JobResources,
    ) -> AudioTrackSet {
        match self.music_track(music_path, target, volume, resources).await {
            Ok(music) => {
                info!(
                    path = %music_path.display(),
                    repeats = music.repeats(),
                    volume = volume,
                    "Mixing background music"
                );
                let mut tracks = Vec::with_capacity(2);
                if let Some(primary) = primary {
                    tracks.push(primary.trimmed(target));
                }
                tracks.push(music);
                AudioTrackSet {
                    tracks,
                    degraded: false,
                }
            }
            Err(e) => {
                warn!(
                    kind = e.kind(),
                    path = %music_path.display(),
                    "Background music unavailable, keeping original audio: {}", e
                );
                metrics::record_audio_fallback(e.kind());
                AudioTrackSet::degraded(primary)
            }
        }
    }

    async fn music_track(
        &self,
        path: &Path,
        target: f64,
        volume: f32,
        resources: &mut JobResources,
    ) -> MediaResult<AudioTrack> {
        if !volume.is_finite() || volume < 0.0 {
            return Err(MediaError::audio_mix(format!("Invalid music volume {}", volume)));
        }
        let track = self.backend.open_audio(path).await?;
        resources.track(track.source());
        let track = reconcile_audio(track, target)
            .map_err(|e| MediaError::audio_mix(format!("Cannot fit music to {}s: {}", target, e)))?;
        Ok(track.with_volume(volume))
    }
}
