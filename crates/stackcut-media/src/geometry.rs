//! Canvas and square geometry.

use serde::{Deserialize, Serialize};

use stackcut_models::AspectRatio;

use crate::error::{MediaError, MediaResult};

/// Output frame geometry derived from the target height and aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasGeometry {
    pub width: u32,
    pub height: u32,
    /// Side of each stacked square; two squares fill the height
    pub square_size: u32,
}

impl CanvasGeometry {
    /// Compute the canvas for a target height and `w:h` aspect ratio.
    ///
    /// `width = floor(height * w / h)` (truncating), `square_size = height / 2`.
    pub fn compute(target_height: u32, aspect_ratio: AspectRatio) -> MediaResult<Self> {
        if target_height == 0 {
            return Err(MediaError::invalid_config("Target resolution must be positive"));
        }
        if !aspect_ratio.is_valid() {
            return Err(MediaError::invalid_config(format!(
                "Aspect ratio components must be positive, got {}",
                aspect_ratio
            )));
        }

        let width = u64::from(target_height) * u64::from(aspect_ratio.width)
            / u64::from(aspect_ratio.height);
        let width = u32::try_from(width).map_err(|_| {
            MediaError::invalid_config(format!(
                "Canvas width overflows for {}px at {}",
                target_height, aspect_ratio
            ))
        })?;
        if width == 0 {
            return Err(MediaError::invalid_config(format!(
                "Aspect ratio {} yields a zero-width canvas at {}px",
                aspect_ratio, target_height
            )));
        }

        Ok(Self {
            width,
            height: target_height,
            square_size: target_height / 2,
        })
    }

    /// Horizontal offset that centers a square on the canvas.
    ///
    /// Floors toward negative infinity when the square is wider than the canvas.
    pub fn square_x(&self) -> i64 {
        (i64::from(self.width) - i64::from(self.square_size)).div_euclid(2)
    }

    /// Attach the output duration.
    pub fn with_duration(&self, duration: f64) -> CanvasSpec {
        CanvasSpec {
            width: self.width,
            height: self.height,
            duration,
        }
    }
}

/// Output frame size and total output length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSpec {
    pub width: u32,
    pub height: u32,
    /// Seconds; always the primary clip's duration
    pub duration: f64,
}
