//! Application state.

use std::sync::Arc;

use stackcut_media::{Compositor, MediaConfig};
use stackcut_models::UploadDefaults;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub compositor: Arc<Compositor>,
    pub defaults: Arc<UploadDefaults>,
}

impl AppState {
    pub fn new(config: ApiConfig, compositor: Compositor) -> Self {
        Self {
            config,
            compositor: Arc::new(compositor),
            defaults: Arc::new(UploadDefaults::default()),
        }
    }

    /// State with the FFmpeg-backed compositor.
    pub fn from_config(config: ApiConfig, media: &MediaConfig) -> Self {
        Self::new(config, Compositor::from_config(media))
    }
}
