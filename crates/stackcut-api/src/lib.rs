//! Axum HTTP upload boundary.
//!
//! This crate provides:
//! - `POST /api/combine-videos/` multipart upload running one compositing job
//! - Static serving of generated outputs
//! - Health and Prometheus metrics endpoints

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod upload;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
