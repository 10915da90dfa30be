//! Post-composite resizing.
//!
//! Four modes: passthrough, fixed width, fixed height, percentage. The
//! non-fixed axis follows the source aspect ratio. Output dimensions are
//! floored at 1 pixel; a configured value of zero or less disables the step.

use image::RgbaImage;

use crate::resample::resize_rgba;
use crate::settings::{ExportSettings, ResizeMode};

use super::error::ExportError;

/// Apply the configured resize to a watermarked image.
pub fn apply_resize(img: &RgbaImage, exp: &ExportSettings) -> Result<RgbaImage, ExportError> {
    let (w, h) = img.dimensions();
    let value = exp.resize_value;

    let target = match exp.resize_mode {
        ResizeMode::None => None,
        ResizeMode::Width if value > 0 => {
            let new_w = value as u32;
            let ratio = new_w as f64 / w as f64;
            Some((new_w, ((h as f64 * ratio) as u32).max(1)))
        }
        ResizeMode::Height if value > 0 => {
            let new_h = value as u32;
            let ratio = new_h as f64 / h as f64;
            Some((((w as f64 * ratio) as u32).max(1), new_h))
        }
        ResizeMode::Percent if value > 0 => {
            let ratio = value as f64 / 100.0;
            Some((
                ((w as f64 * ratio) as u32).max(1),
                ((h as f64 * ratio) as u32).max(1),
            ))
        }
        // Non-positive values disable the step
        _ => None,
    };

    match target {
        Some((tw, th)) if (tw, th) != (w, h) => {
            resize_rgba(img, tw, th).map_err(ExportError::ResizeFailed)
        }
        _ => Ok(img.clone()),
    }
}
