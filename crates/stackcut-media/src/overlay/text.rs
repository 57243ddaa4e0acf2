//! Caption overlay builder.

use tracing::warn;

use stackcut_models::{OverlayStyle, Rgb, TextPosition, DEFAULT_TEXT_FONT_SIZE};

use super::{Coord, TextLayer};
use crate::error::{MediaError, MediaResult};
use crate::fonts::TextRenderer;
use crate::geometry::CanvasSpec;
use crate::metrics;

/// Distance from the top edge for `top` captions.
pub const TOP_MARGIN: i64 = 40;
/// Distance from the bottom edge for `bottom` captions.
pub const BOTTOM_MARGIN: i64 = 20;

/// Resolve a caption anchor on a `width x height` canvas, offsets included.
///
/// Explicit coordinates are used verbatim; `top` and unknown names sit 40px
/// from the top, `bottom` 20px above the bottom edge, both centered.
pub fn resolve_anchor(
    position: &TextPosition,
    width: u32,
    height: u32,
    x_offset: i64,
    y_offset: i64,
) -> (Coord, Coord) {
    let (x, y) = match position {
        TextPosition::At { x, y } => (Coord::Fixed(*x), Coord::Fixed(*y)),
        TextPosition::Bottom => (
            centered(width),
            Coord::FromEnd {
                span: i64::from(height),
                margin: BOTTOM_MARGIN,
                bias: 0,
            },
        ),
        TextPosition::Top | TextPosition::Named(_) => (centered(width), Coord::Fixed(TOP_MARGIN)),
    };
    (x.offset(x_offset), y.offset(y_offset))
}

fn centered(span: u32) -> Coord {
    Coord::Centered {
        span: i64::from(span),
        bias: 0,
    }
}

/// Build the caption layer for `style`.
///
/// Font, color, size or opacity problems do not fail the job: the caption is
/// re-rendered in the fallback style (fallback font, 40px, white, centered
/// on the top edge). Only a missing fallback font is an error.
pub fn build_text_overlay(
    renderer: &TextRenderer,
    style: &OverlayStyle,
    canvas: &CanvasSpec,
) -> MediaResult<TextLayer> {
    match styled_layer(renderer, style, canvas) {
        Ok(layer) => Ok(layer),
        Err(e) => {
            warn!(
                kind = e.kind(),
                font = %style.font,
                color = %style.color,
                "Caption style failed, using fallback style: {}", e
            );
            metrics::record_overlay_fallback("text", e.kind());
            fallback_layer(renderer, &style.text, canvas)
        }
    }
}

fn styled_layer(
    renderer: &TextRenderer,
    style: &OverlayStyle,
    canvas: &CanvasSpec,
) -> MediaResult<TextLayer> {
    if style.font_size == 0 {
        return Err(MediaError::overlay("Font size must be positive"));
    }
    if !(0.0..=1.0).contains(&style.opacity) {
        return Err(MediaError::overlay(format!(
            "Opacity must be between 0 and 1, got {}",
            style.opacity
        )));
    }
    let color: Rgb = style
        .color
        .parse()
        .map_err(|e| MediaError::overlay(format!("{}", e)))?;
    let font_file = renderer.font_file(&style.font)?;
    let (x, y) = resolve_anchor(
        &style.position,
        canvas.width,
        canvas.height,
        style.x_offset,
        style.y_offset,
    );

    Ok(TextLayer {
        text: style.text.clone(),
        font_file,
        font_size: style.font_size,
        color,
        opacity: style.opacity,
        x,
        y,
        duration: canvas.duration,
    })
}

/// Caption in the fallback style: centered on the top edge, offsets ignored.
pub fn fallback_layer(
    renderer: &TextRenderer,
    text: &str,
    canvas: &CanvasSpec,
) -> MediaResult<TextLayer> {
    Ok(TextLayer {
        text: text.to_string(),
        font_file: renderer.fallback_font_file()?,
        font_size: DEFAULT_TEXT_FONT_SIZE,
        color: Rgb::WHITE,
        opacity: 1.0,
        x: centered(canvas.width),
        y: Coord::Fixed(0),
        duration: canvas.duration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::test_support::*;
    use std::path::PathBuf;

    const CANVAS: CanvasSpec = CanvasSpec {
        width: 607,
        height: 1080,
        duration: 5.0,
    };

    #[test]
    fn test_top_anchor() {
        let (x, y) = resolve_anchor(&TextPosition::Top, 607, 1080, 0, 0);
        assert_eq!(y.resolve(48), 40);
        assert_eq!(x.resolve(207), 200);
    }

    #[test]
    fn test_bottom_anchor() {
        let (_, y) = resolve_anchor(&TextPosition::Bottom, 607, 1080, 0, 0);
        let th = 57;
        assert_eq!(y.resolve(th), 1080 - th - 20);
    }

    #[test]
    fn test_unknown_name_falls_back_to_top() {
        let (_, y) = resolve_anchor(&TextPosition::Named("middle".into()), 607, 1080, 0, 0);
        assert_eq!(y.resolve(30), 40);
    }

    #[test]
    fn test_explicit_coordinate_verbatim_plus_offsets() {
        let (x, y) = resolve_anchor(&TextPosition::At { x: 12, y: 300 }, 607, 1080, 5, -10);
        assert_eq!(x.resolve(999), 17);
        assert_eq!(y.resolve(999), 290);
    }

    #[test]
    fn test_offsets_added_after_anchor() {
        let (x, y) = resolve_anchor(&TextPosition::Bottom, 607, 1080, 10, -5);
        assert_eq!(x.resolve(7), 300 + 10);
        assert_eq!(y.resolve(60), 1080 - 60 - 20 - 5);
    }

    #[test]
    fn test_styled_caption() {
        let style = OverlayStyle::new("Follow for more!\nLike & Subscribe")
            .with_font("Impact")
            .with_font_size(50)
            .with_color("#FFD700")
            .with_position(TextPosition::Bottom);
        let layer = build_text_overlay(&renderer(), &style, &CANVAS).unwrap();

        assert_eq!(layer.font_file, PathBuf::from(IMPACT_FILE));
        assert_eq!(layer.font_size, 50);
        assert_eq!(layer.color, Rgb::new(255, 215, 0));
        assert_eq!(layer.duration, 5.0);
        assert_eq!(layer.text, "Follow for more!\nLike & Subscribe");
        assert_eq!(layer.position_for(300, 100), (153, 960));
    }

    #[test]
    fn test_missing_font_uses_fallback_style() {
        let style = OverlayStyle::new("hi")
            .with_font("Comic Sans")
            .with_font_size(72)
            .with_color("red")
            .with_position(TextPosition::Bottom)
            .with_offsets(10, 10);
        let layer = build_text_overlay(&renderer(), &style, &CANVAS).unwrap();

        assert_eq!(layer.font_file, PathBuf::from(FALLBACK_FONT_FILE));
        assert_eq!(layer.font_size, 40);
        assert_eq!(layer.color, Rgb::WHITE);
        assert_eq!(layer.text, "hi");
        assert_eq!(layer.position_for(107, 40), (250, 0));
    }

    #[test]
    fn test_bad_color_uses_fallback_style() {
        let style = OverlayStyle::new("hi").with_color("not-a-color");
        let layer = build_text_overlay(&renderer(), &style, &CANVAS).unwrap();
        assert_eq!(layer.font_file, PathBuf::from(FALLBACK_FONT_FILE));
        assert_eq!(layer.color, Rgb::WHITE);
    }

    #[test]
    fn test_fallback_unavailable_is_error() {
        let style = OverlayStyle::new("hi").with_font("Impact");
        let err = build_text_overlay(&empty_renderer(), &style, &CANVAS).unwrap_err();
        assert!(matches!(err, MediaError::OverlayRender(_)));
    }
}
