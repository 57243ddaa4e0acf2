//! Pipeline metrics.
//!
//! Recorded through the `metrics` facade; a binary decides whether a
//! recorder (e.g. Prometheus) is installed.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_COMPLETED_TOTAL: &str = "stackcut_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "stackcut_jobs_failed_total";
    pub const OVERLAY_FALLBACKS_TOTAL: &str = "stackcut_overlay_fallbacks_total";
    pub const AUDIO_FALLBACKS_TOTAL: &str = "stackcut_audio_fallbacks_total";
    pub const ENCODE_DURATION_SECONDS: &str = "stackcut_encode_duration_seconds";
}

/// Record a successfully written composite.
pub fn record_job_completed() {
    counter!(names::JOBS_COMPLETED_TOTAL).increment(1);
}

/// Record an aborted job.
pub fn record_job_failed(kind: &'static str) {
    counter!(names::JOBS_FAILED_TOTAL, "kind" => kind).increment(1);
}

/// Record an overlay that degraded to the fallback style.
pub fn record_overlay_fallback(layer: &'static str, kind: &'static str) {
    counter!(names::OVERLAY_FALLBACKS_TOTAL, "layer" => layer, "kind" => kind).increment(1);
}

/// Record a background-music mix that degraded to primary audio only.
pub fn record_audio_fallback(kind: &'static str) {
    counter!(names::AUDIO_FALLBACKS_TOTAL, "kind" => kind).increment(1);
}

/// Record the wall time of the final encode.
pub fn record_encode_duration(duration_secs: f64) {
    histogram!(names::ENCODE_DURATION_SECONDS).record(duration_secs);
}
