//! Text overlay layers.
//!
//! Text is rasterized by FFmpeg's `drawtext` at encode time, so the rendered
//! extent is not known while the layer stack is built. Positions are kept as
//! [`Coord`] values: affine in the text extent, resolvable for a given extent
//! and renderable as a `drawtext` expression over `text_w`/`text_h`.

pub mod text;
pub mod watermark;

pub use text::{build_text_overlay, resolve_anchor};
pub use watermark::build_watermark;

use std::path::{Path, PathBuf};

use stackcut_models::Rgb;

/// One axis of a text position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coord {
    /// Constant pixel position
    Fixed(i64),
    /// `floor((span - extent) / 2) + bias`
    Centered { span: i64, bias: i64 },
    /// `span - extent - margin + bias`
    FromEnd { span: i64, margin: i64, bias: i64 },
}

impl Coord {
    /// Position for a text of `extent` pixels along this axis.
    pub fn resolve(&self, extent: i64) -> i64 {
        match *self {
            Coord::Fixed(v) => v,
            Coord::Centered { span, bias } => (span - extent).div_euclid(2) + bias,
            Coord::FromEnd { span, margin, bias } => span - extent - margin + bias,
        }
    }

    /// Shift by `delta` pixels.
    pub fn offset(self, delta: i64) -> Self {
        match self {
            Coord::Fixed(v) => Coord::Fixed(v + delta),
            Coord::Centered { span, bias } => Coord::Centered {
                span,
                bias: bias + delta,
            },
            Coord::FromEnd { span, margin, bias } => Coord::FromEnd {
                span,
                margin,
                bias: bias + delta,
            },
        }
    }

    /// Expression over the extent variable (`text_w` or `text_h`).
    pub fn to_expr(&self, extent_var: &str) -> String {
        match *self {
            Coord::Fixed(v) => v.to_string(),
            Coord::Centered { span, bias } => {
                format!("floor(({}-{})/2){}", span, extent_var, signed(bias))
            }
            Coord::FromEnd { span, margin, bias } => {
                format!("{}-{}", span - margin + bias, extent_var)
            }
        }
    }
}

fn signed(v: i64) -> String {
    if v < 0 {
        v.to_string()
    } else {
        format!("+{}", v)
    }
}

/// A positioned, timed text layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayer {
    pub text: String,
    pub font_file: PathBuf,
    pub font_size: u32,
    pub color: Rgb,
    pub opacity: f32,
    pub x: Coord,
    pub y: Coord,
    /// Visible from 0 to `duration` seconds
    pub duration: f64,
}

impl TextLayer {
    /// Top-left corner for a rendered text of `text_w x text_h`.
    pub fn position_for(&self, text_w: i64, text_h: i64) -> (i64, i64) {
        (self.x.resolve(text_w), self.y.resolve(text_h))
    }

    /// `drawtext` filter reading the caption from `text_file`.
    pub fn drawtext_filter(&self, text_file: &Path) -> String {
        format!(
            "drawtext=fontfile='{}':textfile='{}':expansion=none:fontsize={}:fontcolor={}:alpha={:.2}:x='{}':y='{}':enable='between(t,0,{:.3})'",
            escape_filter_path(&self.font_file.to_string_lossy()),
            escape_filter_path(&text_file.to_string_lossy()),
            self.font_size,
            self.color.to_ffmpeg(),
            self.opacity,
            self.x.to_expr("text_w"),
            self.y.to_expr("text_h"),
            self.duration,
        )
    }
}

/// Escape a path for use inside a quoted filter argument.
pub(crate) fn escape_filter_path(path: &str) -> String {
    path.replace('\\', "\\\\").replace('\'', "\\'").replace(':', "\\:")
}
