//! Duration reconciliation by looping or trimming.

use crate::clip::{AudioTrack, ClipHandle};
use crate::error::{MediaError, MediaResult};

/// How a source of `duration` seconds reaches a target length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopPlan {
    /// Copies played back to back (1 = no loop)
    pub repeats: u32,
    /// Final length in seconds
    pub trim_to: f64,
}

impl LoopPlan {
    /// Shorter sources repeat `ceil(target / duration)` times; the result is
    /// always cut to exactly `target`.
    pub fn for_durations(duration: f64, target: f64) -> MediaResult<Self> {
        if !(duration.is_finite() && duration > 0.0) {
            return Err(MediaError::invalid_config(format!(
                "Source duration must be positive, got {}",
                duration
            )));
        }
        if !(target.is_finite() && target > 0.0) {
            return Err(MediaError::invalid_config(format!(
                "Target duration must be positive, got {}",
                target
            )));
        }

        let repeats = if duration < target {
            let repeats = (target / duration).ceil();
            if repeats > f64::from(u32::MAX) {
                return Err(MediaError::invalid_config(format!(
                    "{}s source cannot be looped to {}s",
                    duration, target
                )));
            }
            repeats as u32
        } else {
            1
        };

        Ok(Self {
            repeats,
            trim_to: target,
        })
    }

    pub fn loops(&self) -> bool {
        self.repeats > 1
    }
}

/// Loop or trim a clip so it lasts exactly `target` seconds.
pub fn reconcile_duration(clip: ClipHandle, target: f64) -> MediaResult<ClipHandle> {
    let plan = LoopPlan::for_durations(clip.duration(), target)?;
    let clip = if plan.loops() {
        clip.looped(plan.repeats)?
    } else {
        clip
    };
    clip.trimmed(plan.trim_to)
}

/// Loop or trim an audio track so it lasts exactly `target` seconds.
pub fn reconcile_audio(track: AudioTrack, target: f64) -> MediaResult<AudioTrack> {
    let plan = LoopPlan::for_durations(track.duration(), target)?;
    let track = if plan.loops() {
        track.looped(plan.repeats)?
    } else {
        track
    };
    Ok(track.trimmed(plan.trim_to))
}
