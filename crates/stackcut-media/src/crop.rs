//! Center square cropping.

use crate::clip::ClipHandle;
use crate::error::{MediaError, MediaResult};

/// Axis along which a frame is trimmed to become square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropAxis {
    Width,
    Height,
}

/// Region kept by the square cropper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub axis: CropAxis,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Symmetric center crop of a `width x height` frame toward a square.
///
/// The longer side loses `(longer - shorter) / 2` pixels on each side; an odd
/// difference leaves the kept region one pixel longer than the shorter side,
/// which the subsequent resize absorbs. Square frames take the `Height`
/// branch with a zero-pixel trim.
pub fn square_crop_region(width: u32, height: u32) -> CropRegion {
    if width > height {
        let trim = (width - height) / 2;
        CropRegion {
            axis: CropAxis::Width,
            x: trim,
            y: 0,
            width: width - 2 * trim,
            height,
        }
    } else {
        let trim = (height - width) / 2;
        CropRegion {
            axis: CropAxis::Height,
            x: 0,
            y: trim,
            width,
            height: height - 2 * trim,
        }
    }
}

/// Center-crop a clip to a square and resize it to `size x size`.
///
/// Duration and frame order are unchanged.
pub fn square_crop(clip: ClipHandle, size: u32) -> MediaResult<ClipHandle> {
    if size == 0 {
        return Err(MediaError::invalid_config("Square size must be positive"));
    }
    let region = square_crop_region(clip.width(), clip.height());
    clip.cropped(region.x, region.y, region.width, region.height)?
        .resized(size, size)
}
