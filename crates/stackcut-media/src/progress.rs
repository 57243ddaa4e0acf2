//! Encode progress from FFmpeg's `-progress pipe:2` key/value stream.

use serde::Serialize;

/// Keys FFmpeg emits in a progress block.
const PROGRESS_KEYS: &[&str] = &[
    "frame",
    "fps",
    "bitrate",
    "total_size",
    "out_time_us",
    "out_time_ms",
    "out_time",
    "dup_frames",
    "drop_frames",
    "speed",
    "progress",
];

/// Running state of one encode.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EncodeProgress {
    pub frame: u64,
    /// Seconds of output written so far
    pub out_time: f64,
    /// Multiple of realtime; 0 until FFmpeg reports one
    pub speed: f64,
    pub finished: bool,
}

impl EncodeProgress {
    /// Fold one stderr line into the state.
    ///
    /// Returns `true` when the line closes a progress block, i.e. the state
    /// is a fresh snapshot worth reporting.
    pub fn apply(&mut self, line: &str) -> bool {
        let Some((key, value)) = line.trim().split_once('=') else {
            return false;
        };
        match key {
            // Both carry microseconds
            "out_time_us" | "out_time_ms" => {
                if let Ok(us) = value.parse::<i64>() {
                    self.out_time = us.max(0) as f64 / 1_000_000.0;
                }
            }
            "frame" => {
                if let Ok(frame) = value.parse() {
                    self.frame = frame;
                }
            }
            "speed" => {
                if let Some(speed) = value.strip_suffix('x').and_then(|s| s.trim().parse().ok()) {
                    self.speed = speed;
                }
            }
            "progress" => {
                self.finished = value == "end";
                return true;
            }
            _ => {}
        }
        false
    }

    /// Share of `total` seconds written, in `0.0..=1.0`.
    pub fn fraction_of(&self, total: f64) -> f64 {
        if !(total > 0.0) {
            return 0.0;
        }
        (self.out_time / total).clamp(0.0, 1.0)
    }
}

/// Whether a stderr line belongs to the progress stream rather than
/// FFmpeg's own diagnostics.
pub fn is_progress_line(line: &str) -> bool {
    line.split_once('=').is_some_and(|(key, _)| {
        let key = key.trim();
        PROGRESS_KEYS.contains(&key) || key.starts_with("stream_")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_snapshot() {
        let mut progress = EncodeProgress::default();
        assert!(!progress.apply("frame=150"));
        assert!(!progress.apply("out_time_us=2500000"));
        assert!(!progress.apply("speed=1.5x"));
        assert!(progress.apply("progress=continue"));

        assert_eq!(progress.frame, 150);
        assert_eq!(progress.out_time, 2.5);
        assert!((progress.fraction_of(5.0) - 0.5).abs() < 1e-9);
        assert!(!progress.finished);

        assert!(!progress.apply("speed=N/A"));
        assert_eq!(progress.speed, 1.5);
        assert!(progress.apply("progress=end"));
        assert!(progress.finished);
    }

    #[test]
    fn test_fraction_bounds() {
        let progress = EncodeProgress {
            out_time: 8.0,
            ..Default::default()
        };
        assert_eq!(progress.fraction_of(5.0), 1.0);
        assert_eq!(progress.fraction_of(0.0), 0.0);
    }

    #[test]
    fn test_diagnostics_are_not_progress() {
        assert!(is_progress_line("bitrate=1200.5kbits/s"));
        assert!(is_progress_line("stream_0_0_q=28.0"));
        assert!(!is_progress_line("[Parsed_drawtext_3 @ 0x55] Cannot find a valid font"));
        assert!(!is_progress_line("Option x=1 not found"));
        assert!(!EncodeProgress::default().apply("Error opening output file"));
    }
}
