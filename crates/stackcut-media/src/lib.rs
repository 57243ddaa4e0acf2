//! Vertical split-screen compositing.
//!
//! This crate provides:
//! - Canvas geometry, square cropping and duration reconciliation
//! - Watermark and caption overlay builders
//! - Background music mixing
//! - The [`Compositor`] that stacks two clips and encodes them in one
//!   FFmpeg run, behind the [`MediaBackend`] seam
//! - FFmpeg/FFprobe plumbing: command builder, runner, probe, progress

pub mod audio;
pub mod backend;
pub mod clip;
pub mod command;
pub mod compositor;
pub mod config;
pub mod crop;
pub mod error;
pub mod fonts;
pub mod geometry;
pub mod graph;
pub mod logging;
pub mod metrics;
pub mod overlay;
pub mod probe;
pub mod progress;
pub mod reconcile;
pub mod resources;

pub use audio::{AudioMixer, AudioTrackSet};
pub use backend::{FfmpegBackend, MediaBackend};
pub use clip::{AudioOp, AudioTrack, ClipHandle, HandleId, VideoOp};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use compositor::{CompositeOutput, Compositor};
pub use config::MediaConfig;
pub use crop::{square_crop, square_crop_region, CropAxis, CropRegion};
pub use error::{MediaError, MediaResult};
pub use fonts::{FontCatalog, TextRenderer};
pub use geometry::{CanvasGeometry, CanvasSpec};
pub use graph::{Layer, RenderPlan};
pub use logging::JobLogger;
pub use overlay::{build_text_overlay, build_watermark, resolve_anchor, Coord, TextLayer};
pub use probe::{probe_audio, probe_video, AudioInfo, VideoInfo};
pub use progress::EncodeProgress;
pub use reconcile::{reconcile_audio, reconcile_duration, LoopPlan};
pub use resources::JobResources;
