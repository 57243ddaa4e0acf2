//! API integration tests.
//!
//! The router runs against an in-memory media backend, so no FFmpeg is
//! needed. Uploaded file contents select the probed shape of each source.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use stackcut_api::{create_router, ApiConfig, AppState};
use stackcut_media::{
    AudioInfo, AudioTrack, ClipHandle, Compositor, FfmpegCommand, FontCatalog, HandleId,
    MediaBackend, MediaError, MediaResult, TextRenderer, VideoInfo,
};

const BOUNDARY: &str = "stackcut-test-boundary";

#[derive(Default)]
struct UploadBackend {
    fail_encode: bool,
    next_id: AtomicU64,
    released: AtomicU64,
}

impl UploadBackend {
    fn next(&self) -> HandleId {
        HandleId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn opened(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst)
    }

    fn released(&self) -> u64 {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaBackend for UploadBackend {
    async fn open_video(&self, path: &Path) -> MediaResult<ClipHandle> {
        let contents = std::fs::read_to_string(path).unwrap_or_default();
        let (width, height, duration) = match contents.as_str() {
            "landscape" => (1920, 1080, 5.0),
            "portrait" => (720, 1280, 2.0),
            _ => return Err(MediaError::open_failed(path, "Invalid data found when processing input")),
        };
        let info = VideoInfo {
            duration,
            width,
            height,
            fps: 30.0,
            codec: "h264".to_string(),
            audio_duration: Some(duration),
        };
        Ok(ClipHandle::open(self.next(), path, &info))
    }

    async fn open_audio(&self, path: &Path) -> MediaResult<AudioTrack> {
        let info = AudioInfo {
            duration: 3.0,
            codec: "mp3".to_string(),
            sample_rate: Some(44100),
            channels: Some(2),
        };
        Ok(AudioTrack::open(self.next(), path, &info))
    }

    async fn encode(&self, command: &FfmpegCommand, _expected_duration: f64) -> MediaResult<()> {
        if self.fail_encode {
            std::fs::write(command.output(), b"partial")?;
            return Err(MediaError::encode_failed(
                "FFmpeg exited with non-zero status",
                Some("Conversion failed!".to_string()),
                Some(1),
            ));
        }
        std::fs::write(command.output(), b"composite")?;
        Ok(())
    }

    fn release(&self, _handle: HandleId) -> MediaResult<()> {
        self.released.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct TestApp {
    router: Router,
    backend: Arc<UploadBackend>,
    config: ApiConfig,
    _media: TempDir,
}

impl TestApp {
    fn new(backend: UploadBackend) -> Self {
        Self::in_environment(backend, "development")
    }

    fn in_environment(backend: UploadBackend, environment: &str) -> Self {
        let media = TempDir::new().unwrap();
        let config = ApiConfig {
            media_root: media.path().to_path_buf(),
            environment: environment.to_string(),
            metrics_enabled: false,
            ..ApiConfig::default()
        };

        let backend = Arc::new(backend);
        let fonts = FontCatalog::from_entries([
            ("DejaVuSans-Bold", "/fonts/DejaVuSans-Bold.ttf"),
            ("Impact", "/fonts/Impact.ttf"),
        ]);
        let compositor = Compositor::new(
            backend.clone(),
            Arc::new(TextRenderer::new(fonts, "DejaVuSans-Bold")),
        )
        .with_work_dir(Some(media.path().join("work")));

        let router = create_router(AppState::new(config.clone(), compositor), None);
        Self {
            router,
            backend,
            config,
            _media: media,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    async fn upload(&self, form: Form) -> (StatusCode, Value) {
        let (status, body) = self.send(form.request()).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn uploads_left(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(self.config.input_dir()) {
            Ok(entries) => entries.flatten().map(|e| e.path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    fn outputs(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(self.config.output_dir()) {
            Ok(entries) => entries.flatten().map(|e| e.path()).collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// Hand-built multipart form.
#[derive(Default)]
struct Form {
    body: Vec<u8>,
}

impl Form {
    fn new() -> Self {
        Self::default()
    }

    fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    fn file(mut self, name: &str, file_name: &str, contents: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n{}\r\n",
                BOUNDARY, name, file_name, contents
            )
            .as_bytes(),
        );
        self
    }

    fn videos(self) -> Self {
        self.file("video1", "main.mp4", "landscape")
            .file("video2", "loop.mov", "portrait")
    }

    fn request(mut self) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        Request::builder()
            .method("POST")
            .uri("/api/combine-videos/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new(UploadBackend::default());
    let (status, body) = app
        .send(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_metrics_endpoint_disabled() {
    let app = TestApp::new(UploadBackend::default());
    let (status, _) = app
        .send(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_combine_success() {
    let app = TestApp::new(UploadBackend::default());
    let (status, json) = app
        .upload(Form::new().videos().text("aspect_ratio", "9:16").text("target_resolution", "1080"))
        .await;

    assert_eq!(status, StatusCode::OK, "{}", json);
    assert_eq!(json["message"], "Video processing completed");
    let url = json["output_url"].as_str().unwrap();
    assert!(url.starts_with("/media/output_videos/"));
    assert!(url.ends_with(".mp4"));

    assert_eq!(app.outputs().len(), 1);
    assert!(app.uploads_left().is_empty());
    assert_eq!(app.backend.opened(), 2);
    assert_eq!(app.backend.released(), 2);

    // Output is served from the media root
    let (status, body) = app
        .send(Request::builder().uri(url).body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"composite");
}

#[tokio::test]
async fn test_combine_with_background_music() {
    let app = TestApp::new(UploadBackend::default());
    let (status, json) = app
        .upload(
            Form::new()
                .videos()
                .file("background_music", "song.mp3", "music")
                .text("bg_music_volume", "0.5"),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{}", json);
    assert_eq!(app.backend.opened(), 3);
    assert_eq!(app.backend.released(), 3);
    assert!(app.uploads_left().is_empty());
}

#[tokio::test]
async fn test_empty_music_field_is_ignored() {
    let app = TestApp::new(UploadBackend::default());
    let (status, _) = app
        .upload(Form::new().videos().file("background_music", "", ""))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.backend.opened(), 2);
    assert!(app.uploads_left().is_empty());
}

#[tokio::test]
async fn test_missing_video_is_bad_request() {
    let app = TestApp::new(UploadBackend::default());
    let (status, json) = app
        .upload(Form::new().file("video1", "main.mp4", "landscape").text("watermark", "@me"))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Both videos are required");
    assert!(app.uploads_left().is_empty());
    assert_eq!(app.backend.opened(), 0);
}

#[tokio::test]
async fn test_invalid_aspect_ratio_is_bad_request() {
    let app = TestApp::new(UploadBackend::default());
    let (status, json) = app
        .upload(Form::new().videos().text("aspect_ratio", "wide"))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid input value: aspect_ratio"));
    assert!(app.uploads_left().is_empty());
    assert!(app.outputs().is_empty());
}

#[tokio::test]
async fn test_invalid_number_is_bad_request() {
    let app = TestApp::new(UploadBackend::default());
    let (status, json) = app
        .upload(Form::new().videos().text("video1_offset", "ten"))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid input value: video1_offset"));
}

#[tokio::test]
async fn test_unreadable_video_is_server_error() {
    let app = TestApp::new(UploadBackend::default());
    let (status, json) = app
        .upload(
            Form::new()
                .file("video1", "main.mp4", "landscape")
                .file("video2", "broken.mp4", "garbage"),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("Failed to open"));
    assert!(app.uploads_left().is_empty());
    assert_eq!(app.backend.released(), app.backend.opened());
}

#[tokio::test]
async fn test_encode_failure_leaves_no_output() {
    let app = TestApp::new(UploadBackend {
        fail_encode: true,
        ..UploadBackend::default()
    });
    let (status, json) = app.upload(Form::new().videos()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].is_string());
    assert!(app.outputs().is_empty());
    assert!(app.uploads_left().is_empty());
    assert_eq!(app.backend.released(), 2);
}

#[tokio::test]
async fn test_production_hides_server_error_details() {
    let app = TestApp::in_environment(
        UploadBackend {
            fail_encode: true,
            ..UploadBackend::default()
        },
        "Production",
    );
    let (status, json) = app.upload(Form::new().videos()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
    assert!(app.outputs().is_empty());
}

#[tokio::test]
async fn test_production_keeps_client_error_details() {
    let app = TestApp::in_environment(UploadBackend::default(), "production");
    let (status, json) = app
        .upload(Form::new().file("video1", "main.mp4", "landscape"))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Both videos are required");
}
