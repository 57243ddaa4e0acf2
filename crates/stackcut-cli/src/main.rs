//! Stack two clips into one vertical video from the command line.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stackcut_media::{check_ffmpeg, CompositeOutput, Compositor, MediaConfig, MediaError};
use stackcut_models::{
    AspectRatio, JobId, JobParameters, OverlayStyle, Rgb, TextPosition, WatermarkStyle,
    DEFAULT_BG_MUSIC_VOLUME, DEFAULT_OVERLAY_FONT, DEFAULT_TARGET_RESOLUTION,
    DEFAULT_TEXT_FONT_SIZE, DEFAULT_VIDEO_OFFSET, DEFAULT_WATERMARK_OPACITY,
};

#[derive(Parser, Debug)]
#[command(name = "stackcut", version, about)]
struct Cli {
    /// Primary clip: drives the output duration and audio.
    primary: PathBuf,

    /// Secondary clip: looped or trimmed to the primary's duration.
    secondary: PathBuf,

    /// Output MP4 path.
    #[arg(short, long)]
    output: PathBuf,

    /// Output height in pixels.
    #[arg(long, default_value_t = DEFAULT_TARGET_RESOLUTION)]
    resolution: u32,

    /// Output aspect ratio as `W:H`.
    #[arg(long, default_value = "9:16")]
    aspect_ratio: AspectRatio,

    /// Primary clip offset from the top edge.
    #[arg(long, default_value_t = DEFAULT_VIDEO_OFFSET, allow_negative_numbers = true)]
    video1_offset: i64,

    /// Secondary clip pull-up from the square boundary.
    #[arg(long, default_value_t = DEFAULT_VIDEO_OFFSET, allow_negative_numbers = true)]
    video2_offset: i64,

    /// Watermark text.
    #[arg(long)]
    watermark: Option<String>,

    #[arg(long, default_value_t = DEFAULT_WATERMARK_OPACITY)]
    watermark_opacity: f32,

    /// Caption text.
    #[arg(long)]
    text: Option<String>,

    /// `top`, `bottom` or `x,y`.
    #[arg(long, default_value = "top")]
    text_position: TextPosition,

    #[arg(long, default_value_t = DEFAULT_TEXT_FONT_SIZE)]
    text_fontsize: u32,

    #[arg(long, default_value = "white")]
    text_color: String,

    /// Font family or font file path.
    #[arg(long, default_value = DEFAULT_OVERLAY_FONT)]
    text_font: String,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    text_x_offset: i64,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    text_y_offset: i64,

    #[arg(long, default_value_t = 1.0)]
    text_opacity: f32,

    /// Background music, looped or trimmed to the output duration.
    #[arg(long)]
    background_music: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_BG_MUSIC_VOLUME)]
    bg_music_volume: f32,

    /// Canvas color behind the clips.
    #[arg(long, default_value = "black")]
    background_color: Rgb,

    /// Print the result as JSON on stdout.
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl Cli {
    fn job_parameters(&self) -> JobParameters {
        let mut builder = JobParameters::builder(&self.primary, &self.secondary, &self.output)
            .target_resolution(self.resolution)
            .aspect_ratio(self.aspect_ratio)
            .offsets(self.video1_offset, self.video2_offset)
            .bg_music_volume(self.bg_music_volume)
            .background_color(self.background_color);

        if let Some(text) = &self.watermark {
            builder = builder
                .watermark(WatermarkStyle::new(text.clone()).with_opacity(self.watermark_opacity));
        }
        if let Some(text) = &self.text {
            builder = builder.text_overlay(
                OverlayStyle::new(text.clone())
                    .with_font(self.text_font.clone())
                    .with_font_size(self.text_fontsize)
                    .with_color(self.text_color.clone())
                    .with_position(self.text_position.clone())
                    .with_offsets(self.text_x_offset, self.text_y_offset)
                    .with_opacity(self.text_opacity),
            );
        }
        if let Some(music) = &self.background_music {
            builder = builder.background_music(music, self.bg_music_volume);
        }

        // Validated by the compositor so failures carry a media error kind
        builder.build_unchecked()
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = init_tracing() {
        eprintln!("error: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(&cli).await {
        Ok(output) => {
            if cli.json {
                match serde_json::to_string_pretty(&output) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("error: {}", e);
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                eprintln!(
                    "wrote {} ({}x{}, {:.3}s)",
                    output.path.display(),
                    output.width,
                    output.height,
                    output.duration
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            match e.downcast_ref::<MediaError>() {
                Some(media) => eprintln!("error [{}]: {}", media.kind(), media),
                None => eprintln!("error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<CompositeOutput> {
    let ffmpeg = check_ffmpeg()?;
    info!(ffmpeg = %ffmpeg.display(), "Found FFmpeg");

    let compositor = Compositor::from_config(&MediaConfig::from_env());
    let params = cli.job_parameters();
    let output = compositor.compose(&JobId::new(), &params).await?;
    Ok(output)
}

fn init_tracing() -> anyhow::Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);
    let env_filter = EnvFilter::from_default_env()
        .add_directive("stackcut=info".parse().context("invalid log directive")?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .with(env_filter)
            .init();
    }
    Ok(())
}
