//! FFmpeg command builder and runner.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};
use crate::progress::{is_progress_line, EncodeProgress};

/// Number of stderr diagnostic lines kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// One `-i` input with its own input options.
#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegInput {
    /// Arguments placed before this `-i`
    pub args: Vec<String>,
    pub path: PathBuf,
}

/// Builder for FFmpeg commands with any number of inputs.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    inputs: Vec<FfmpegInput>,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after all inputs)
    output_args: Vec<String>,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command writing to `output`.
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
        }
    }

    /// Add a plain input.
    pub fn input(self, path: impl AsRef<Path>) -> Self {
        self.input_with_args(Vec::<String>::new(), path)
    }

    /// Add an input preceded by input options (e.g. `-stream_loop`).
    pub fn input_with_args<I, S>(mut self, args: I, path: impl AsRef<Path>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.push(FfmpegInput {
            args: args.into_iter().map(Into::into).collect(),
            path: path.as_ref().to_path_buf(),
        });
        self
    }

    /// Add an output argument.
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set filter complex.
    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    /// Map a stream or filter label into the output.
    pub fn map(self, spec: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(spec)
    }

    /// Limit the output duration.
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format!("{:.3}", seconds))
    }

    /// Drop audio from the output.
    pub fn no_audio(self) -> Self {
        self.output_arg("-an")
    }

    pub fn inputs(&self) -> &[FfmpegInput] {
        &self.inputs
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// The `-filter_complex` graph, if one was set.
    pub fn filter_graph(&self) -> Option<&str> {
        self.output_args
            .iter()
            .position(|arg| arg == "-filter_complex")
            .and_then(|idx| self.output_args.get(idx + 1))
            .map(String::as_str)
    }

    /// Value following the last occurrence of an output flag.
    pub fn output_value(&self, flag: &str) -> Option<&str> {
        self.output_args
            .iter()
            .rposition(|arg| arg == flag)
            .and_then(|idx| self.output_args.get(idx + 1))
            .map(String::as_str)
    }

    /// Values following every occurrence of an output flag, in order.
    pub fn output_values(&self, flag: &str) -> Vec<&str> {
        self.output_args
            .windows(2)
            .filter(|pair| pair[0] == flag)
            .map(|pair| pair[1].as_str())
            .collect()
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        // Always overwrite; the output path is unique per job
        args.push("-y".to_string());

        args.push("-hide_banner".to_string());

        // Errors only; progress comes from `-progress`
        args.push("-v".to_string());
        args.push("error".to_string());

        // Progress output to stderr
        args.push("-progress".to_string());
        args.push("pipe:2".to_string());

        for input in &self.inputs {
            args.extend(input.args.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().to_string());
        }

        // Output args
        args.extend(self.output_args.iter().cloned());

        // Output file
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands with progress logging.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRunner {
    /// Expected output duration, used to report progress percentages
    expected_duration_secs: Option<f64>,
}

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report progress relative to an expected output duration.
    pub fn with_expected_duration(mut self, secs: f64) -> Self {
        self.expected_duration_secs = Some(secs);
        self
    }

    /// Run an FFmpeg command to completion.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        let ffmpeg = check_ffmpeg()?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let mut child = Command::new(ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| MediaError::encode_failed(format!("Failed to spawn FFmpeg: {}", e), None, None))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::encode_failed("FFmpeg stderr not captured", None, None))?;
        let total = self.expected_duration_secs.unwrap_or(0.0);
        let diagnostics = drain_stderr(BufReader::new(stderr), total).await?;

        let status = child.wait().await?;

        if status.success() {
            Ok(())
        } else {
            let stderr = Vec::from(diagnostics).join("\n");
            warn!(exit_code = ?status.code(), "FFmpeg exited with non-zero status");
            Err(MediaError::encode_failed(
                "FFmpeg exited with non-zero status",
                (!stderr.is_empty()).then_some(stderr),
                status.code(),
            ))
        }
    }
}

/// Log progress from FFmpeg's stderr and keep the last diagnostic lines.
///
/// Lines are split on raw bytes; invalid UTF-8 is replaced, never an error.
async fn drain_stderr<R>(reader: R, total: f64) -> MediaResult<VecDeque<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut segments = reader.split(b'\n');
    let mut progress = EncodeProgress::default();
    let mut diagnostics: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);

    while let Some(segment) = segments.next_segment().await? {
        let decoded = String::from_utf8_lossy(&segment);
        let line = decoded.trim_end_matches('\r');
        if progress.apply(line) {
            debug!(
                percent = progress.fraction_of(total) * 100.0,
                speed = progress.speed,
                frame = progress.frame,
                "Encoding progress"
            );
        } else if !is_progress_line(line) && !line.trim().is_empty() {
            if diagnostics.len() == STDERR_TAIL_LINES {
                diagnostics.pop_front();
            }
            diagnostics.push_back(line.to_string());
        }
    }

    Ok(diagnostics)
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg")
        .map_err(|_| MediaError::encode_failed("FFmpeg not found in PATH", None, None))
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> Option<PathBuf> {
    which::which("ffprobe").ok()
}
