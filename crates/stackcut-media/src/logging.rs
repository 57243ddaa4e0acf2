//! Structured job logging utilities.
//!
//! Provides consistent, structured logging for compositing jobs with
//! tracing spans and contextual information.

use tracing::{error, info, warn, Span};

use stackcut_models::JobId;

/// Job logger for structured logging with consistent formatting.
///
/// Every event carries the job id and the operation name so one job's
/// lifecycle can be followed through interleaved logs.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    operation: String,
}

impl JobLogger {
    /// Create a logger for a specific job and operation.
    pub fn new(job_id: &JobId, operation: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Job started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Job progress: {}", message
        );
    }

    /// Log a recovered problem, tagged with its error kind.
    pub fn log_warning(&self, kind: &str, message: &str) {
        warn!(
            job_id = %self.job_id,
            operation = %self.operation,
            kind = %kind,
            "Job warning: {}", message
        );
    }

    pub fn log_error(&self, kind: &str, message: &str) {
        error!(
            job_id = %self.job_id,
            operation = %self.operation,
            kind = %kind,
            "Job error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Job completed: {}", message
        );
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Create a tracing span for this job.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "job",
            job_id = %self.job_id,
            operation = %self.operation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_logger_creation() {
        let job_id = JobId::new();
        let logger = JobLogger::new(&job_id, "compose");

        assert_eq!(logger.job_id(), job_id.to_string());
        assert_eq!(logger.operation(), "compose");
    }
}
