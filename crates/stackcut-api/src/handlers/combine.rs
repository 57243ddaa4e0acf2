//! Combine-videos upload handler.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use stackcut_models::JobId;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::upload::{job_parameters, unique_file_name, UploadedFiles};

/// Successful combine response.
#[derive(Debug, Serialize)]
pub struct CombineResponse {
    pub message: String,
    pub output_url: String,
}

/// Run one compositing job from a multipart upload.
///
/// Uploaded inputs are removed when the request ends, whatever the outcome.
pub async fn combine_videos(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<CombineResponse>> {
    run_combine(&state, multipart).await.map_err(|e| {
        if e.status_code().is_server_error() {
            error!(kind = error_kind(&e), "Combine job failed: {}", e);
        }
        e.redacted(state.config.is_production())
    })
}

async fn run_combine(
    state: &AppState,
    mut multipart: Multipart,
) -> ApiResult<Json<CombineResponse>> {
    let input_dir = state.config.input_dir();
    let output_dir = state.config.output_dir();
    tokio::fs::create_dir_all(&input_dir).await?;
    tokio::fs::create_dir_all(&output_dir).await?;

    let mut saved = scopeguard::guard(Vec::<PathBuf>::new(), |paths| remove_inputs(&paths));
    let mut files = UploadedFiles::default();
    let mut fields = HashMap::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        let fallback_ext = match name.as_str() {
            "video1" | "video2" => "mp4",
            "background_music" => "mp3",
            _ => {
                let value = field.text().await.map_err(multipart_error)?;
                fields.insert(name, value);
                continue;
            }
        };

        let path = input_dir.join(unique_file_name(field.file_name(), fallback_ext));
        saved.push(path.clone());
        let written = save_field(field, &path).await?;
        if written == 0 {
            debug!(field = %name, "Ignoring empty upload");
            continue;
        }

        match name.as_str() {
            "video1" => files.video1 = Some(path),
            "video2" => files.video2 = Some(path),
            _ => files.background_music = Some(path),
        }
    }

    let (Some(video1), Some(video2)) = (files.video1.as_deref(), files.video2.as_deref()) else {
        return Err(ApiError::bad_request("Both videos are required"));
    };

    let job_id = JobId::new();
    let output_name = format!("{}.mp4", job_id);
    let output_path = output_dir.join(&output_name);
    let params = job_parameters(
        &fields,
        &state.defaults,
        video1,
        video2,
        files.background_music.as_deref(),
        &output_path,
    )?;

    info!(
        job_id = %job_id,
        has_music = files.background_music.is_some(),
        "Starting combine job"
    );

    let output = state.compositor.compose(&job_id, &params).await?;

    info!(
        job_id = %job_id,
        width = output.width,
        height = output.height,
        duration = output.duration,
        "Combine job completed"
    );

    Ok(Json(CombineResponse {
        message: "Video processing completed".to_string(),
        output_url: state.config.output_url(&output_name),
    }))
}

/// Stream one file field to disk, returning the number of bytes written.
async fn save_field(mut field: Field<'_>, path: &Path) -> ApiResult<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written = 0u64;
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

fn error_kind(e: &ApiError) -> &'static str {
    match e {
        ApiError::Media(media) => media.kind(),
        ApiError::Io(_) => "io",
        _ => "internal",
    }
}

fn multipart_error(e: MultipartError) -> ApiError {
    ApiError::bad_request(format!("Invalid multipart body: {}", e.body_text()))
}

fn remove_inputs(paths: &[PathBuf]) {
    for path in paths {
        match std::fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "Removed upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), "Failed to remove upload: {}", e),
        }
    }
}
