//! API configuration.

use std::path::PathBuf;

/// Subdirectory of the media root holding uploaded sources.
pub const INPUT_DIR: &str = "input_videos";
/// Subdirectory of the media root holding generated composites.
pub const OUTPUT_DIR: &str = "output_videos";

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Root directory for uploads and outputs
    pub media_root: PathBuf,
    /// URL prefix under which the media root is served (with trailing slash)
    pub media_url: String,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Expose Prometheus metrics at `/metrics`
    pub metrics_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            media_root: PathBuf::from("media"),
            media_url: "/media/".to_string(),
            cors_origins: vec!["*".to_string()],
            max_body_size: 512 * 1024 * 1024, // 512MB
            environment: "development".to_string(),
            metrics_enabled: true,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            media_root: std::env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.media_root),
            media_url: std::env::var("MEDIA_URL")
                .map(|s| normalize_media_url(&s))
                .unwrap_or(defaults.media_url),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }

    pub fn input_dir(&self) -> PathBuf {
        self.media_root.join(INPUT_DIR)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.media_root.join(OUTPUT_DIR)
    }

    /// Public URL of a generated output file.
    pub fn output_url(&self, file_name: &str) -> String {
        format!("{}{}/{}", self.media_url, OUTPUT_DIR, file_name)
    }
}

/// Ensure a leading and a trailing slash.
fn normalize_media_url(url: &str) -> String {
    let trimmed = url.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}
