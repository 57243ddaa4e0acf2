//! Job orchestration.
//!
//! One `compose` call runs one job: open both sources, square them, align the
//! secondary to the primary's duration, stack the layers, prepare audio,
//! encode once, and release everything that was opened.

use scopeguard::ScopeGuard;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use stackcut_models::{EncodingProfile, JobId, JobParameters};

use crate::audio::{AudioMixer, AudioTrackSet};
use crate::backend::{FfmpegBackend, MediaBackend};
use crate::command::FfmpegCommand;
use crate::config::MediaConfig;
use crate::crop::square_crop;
use crate::error::{MediaError, MediaResult};
use crate::fonts::TextRenderer;
use crate::geometry::CanvasGeometry;
use crate::graph::RenderPlan;
use crate::logging::JobLogger;
use crate::metrics;
use crate::overlay::{build_text_overlay, build_watermark};
use crate::reconcile::reconcile_duration;
use crate::resources::{discard_output, JobResources};

/// Summary of a written composite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeOutput {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub square_size: u32,
    /// Seconds
    pub duration: f64,
    pub fps: f64,
    /// Text layers rendered (watermark and caption)
    pub text_layers: usize,
    /// Audio tracks summed into the output
    pub audio_tracks: usize,
    /// Whether requested background music had to be dropped
    pub audio_degraded: bool,
}

/// Stacks two clips into one vertical composite.
#[derive(Clone)]
pub struct Compositor {
    backend: Arc<dyn MediaBackend>,
    text: Arc<TextRenderer>,
    encoding: EncodingProfile,
    work_dir: Option<PathBuf>,
}

impl Compositor {
    pub fn new(backend: Arc<dyn MediaBackend>, text: Arc<TextRenderer>) -> Self {
        Self {
            backend,
            text,
            encoding: EncodingProfile::default(),
            work_dir: None,
        }
    }

    /// FFmpeg-backed compositor; scans fonts once.
    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(
            Arc::new(FfmpegBackend::new()),
            Arc::new(TextRenderer::from_config(config)),
        )
        .with_work_dir(config.work_dir.clone())
    }

    pub fn with_encoding(mut self, encoding: EncodingProfile) -> Self {
        self.encoding = encoding;
        self
    }

    /// Root for per-job scratch directories.
    pub fn with_work_dir(mut self, work_dir: Option<PathBuf>) -> Self {
        self.work_dir = work_dir;
        self
    }

    /// Run one job, writing the composite to `params.output_path`.
    ///
    /// Every opened source is released before this returns, on success and
    /// on failure. A failed encode leaves no file at the output path.
    pub async fn compose(&self, job_id: &JobId, params: &JobParameters) -> MediaResult<CompositeOutput> {
        let logger = JobLogger::new(job_id, "compose");
        let span = logger.create_span();

        async move {
            logger.log_start(&format!(
                "{} + {} -> {}",
                params.primary_path.display(),
                params.secondary_path.display(),
                params.output_path.display()
            ));

            let result = match JobResources::new(self.backend.clone(), self.work_dir.as_deref()) {
                Ok(mut resources) => {
                    let result = self.run(params, &mut resources, &logger).await;
                    let released = resources.release_all();
                    logger.log_progress(&format!("Released {} media handles", released));
                    result
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(output) => {
                    metrics::record_job_completed();
                    logger.log_completion(&format!(
                        "{}x{}, {:.3}s, {} audio track(s)",
                        output.width, output.height, output.duration, output.audio_tracks
                    ));
                    Ok(output)
                }
                Err(e) => {
                    metrics::record_job_failed(e.kind());
                    logger.log_error(e.kind(), &e.to_string());
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        params: &JobParameters,
        resources: &mut JobResources,
        logger: &JobLogger,
    ) -> MediaResult<CompositeOutput> {
        params.validate()?;
        let geometry = CanvasGeometry::compute(params.target_resolution, params.aspect_ratio)?;

        let primary = self.backend.open_video(&params.primary_path).await?;
        resources.track(primary.source());
        let secondary = self.backend.open_video(&params.secondary_path).await?;
        resources.track(secondary.source());

        let mut primary = square_crop(primary, geometry.square_size)?;
        let secondary = square_crop(secondary, geometry.square_size)?;

        let target = primary.duration();
        let mut secondary = reconcile_duration(secondary, target)?;
        // Only the primary clip's audio reaches the output
        secondary.take_audio();
        logger.log_progress(&format!(
            "Canvas {}x{}, square {}, {:.3}s, secondary x{}",
            geometry.width,
            geometry.height,
            geometry.square_size,
            target,
            secondary.repeats()
        ));

        let canvas = geometry.with_duration(target);
        let fps = primary.fps();
        let primary_audio = primary.take_audio();
        let x = geometry.square_x();

        let mut plan = RenderPlan::new(canvas, fps, params.background_color);
        plan.push_video(
            secondary,
            x,
            i64::from(geometry.square_size) - params.video2_offset,
        );
        plan.push_video(primary, x, params.video1_offset);

        let mut text_layers = 0;
        if let Some(style) = params.active_watermark() {
            let layer = build_watermark(&self.text, style, &canvas)?;
            let text_file = resources.write_text(&layer.text).await?;
            plan.push_text(layer, text_file);
            text_layers += 1;
        }
        if let Some(style) = params.active_text_overlay() {
            let layer = build_text_overlay(&self.text, style, &canvas)?;
            let text_file = resources.write_text(&layer.text).await?;
            plan.push_text(layer, text_file);
            text_layers += 1;
        }

        let audio = match params.existing_background_music() {
            Some(music) => {
                AudioMixer::new(self.backend.as_ref())
                    .mix(primary_audio, music, target, params.bg_music_volume, resources)
                    .await
            }
            None => {
                if let Some(missing) = &params.background_music_path {
                    logger.log_warning(
                        "audio_mix",
                        &format!(
                            "Background music {} not found, keeping original audio",
                            missing.display()
                        ),
                    );
                }
                AudioTrackSet::primary_only(primary_audio)
            }
        };
        let audio_tracks = audio.len();
        let audio_degraded = audio.is_degraded();
        plan.set_audio(audio);

        let command = plan.compile(&params.output_path, &self.encoding)?;
        self.encode(&command, &params.output_path, target).await?;

        Ok(CompositeOutput {
            path: params.output_path.clone(),
            width: canvas.width,
            height: canvas.height,
            square_size: geometry.square_size,
            duration: canvas.duration,
            fps,
            text_layers,
            audio_tracks,
            audio_degraded,
        })
    }

    async fn encode(
        &self,
        command: &FfmpegCommand,
        output: &Path,
        duration: f64,
    ) -> MediaResult<()> {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Removes the partial file on error and when the job future is dropped
        let pending = scopeguard::guard(output.to_path_buf(), |path| discard_output(&path));

        let started = Instant::now();
        self.backend.encode(command, duration).await?;
        metrics::record_encode_duration(started.elapsed().as_secs_f64());

        if !output.exists() {
            return Err(MediaError::encode_failed(
                format!("Encoder reported success but {} is missing", output.display()),
                None,
                None,
            ));
        }
        ScopeGuard::into_inner(pending);
        Ok(())
    }
}
