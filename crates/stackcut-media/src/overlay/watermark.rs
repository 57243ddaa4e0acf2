//! Watermark overlay builder.
//!
//! The watermark is white text pinned near the left edge, a little below the
//! vertical center, for the whole canvas duration.

use tracing::warn;

use stackcut_models::{Rgb, WatermarkStyle};

use super::{Coord, TextLayer};
use crate::error::{MediaError, MediaResult};
use crate::fonts::TextRenderer;
use crate::geometry::CanvasSpec;
use crate::metrics;

/// Horizontal inset from the left edge (pixels).
pub const WATERMARK_X: i64 = 40;
/// Downward shift from true vertical center (pixels).
pub const WATERMARK_Y_BIAS: i64 = 60;

/// Build the watermark layer.
///
/// An unavailable font falls back to the fallback font at the same size.
pub fn build_watermark(
    renderer: &TextRenderer,
    style: &WatermarkStyle,
    canvas: &CanvasSpec,
) -> MediaResult<TextLayer> {
    if !(0.0..=1.0).contains(&style.opacity) {
        return Err(MediaError::invalid_config(format!(
            "Watermark opacity must be between 0 and 1, got {}",
            style.opacity
        )));
    }
    if style.font_size == 0 {
        return Err(MediaError::overlay("Watermark font size must be positive"));
    }

    let font_file = match renderer.font_file(&style.font) {
        Ok(path) => path,
        Err(e) => {
            warn!(
                kind = e.kind(),
                font = %style.font,
                fallback = %renderer.fallback_font(),
                "Watermark font unavailable, using fallback font"
            );
            metrics::record_overlay_fallback("watermark", e.kind());
            renderer.fallback_font_file()?
        }
    };

    Ok(TextLayer {
        text: style.text.clone(),
        font_file,
        font_size: style.font_size,
        color: Rgb::WHITE,
        opacity: style.opacity,
        x: Coord::Fixed(WATERMARK_X),
        y: Coord::Centered {
            span: i64::from(canvas.height),
            bias: WATERMARK_Y_BIAS,
        },
        duration: canvas.duration,
    })
}
