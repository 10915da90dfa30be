//! Anchor resolution for watermark placement.
//!
//! Maps a watermark's size plus a placement rule to the top-left pixel
//! coordinate on the base image. Two rules exist: one of nine named anchor
//! presets with an edge offset, or a normalized free position that overrides
//! the preset entirely.
//!
//! No result is ever clamped. A watermark larger than the base, or an offset
//! exceeding the base's bounds, yields negative or out-of-range coordinates
//! and the watermark renders partially or fully off-canvas. Callers that
//! need guaranteed visibility must validate sizes upstream.

use crate::settings::AnchorPreset;

/// Dimensions of the base image.
#[derive(Debug, Clone, Copy)]
pub struct BaseDimensions {
    pub width: u32,
    pub height: u32,
}

/// Dimensions of the watermark to be placed.
#[derive(Debug, Clone, Copy)]
pub struct WatermarkDimensions {
    pub width: u32,
    pub height: u32,
}

/// Resolved top-left placement coordinate. May be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub x: i32,
    pub y: i32,
}

impl Anchor {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Resolve an anchor from one of the nine presets.
///
/// Centering uses integer floor division. `offset` is the padding from the
/// nearest edge and only applies on the axis the preset pins to an edge.
pub fn resolve_preset(
    preset: AnchorPreset,
    base: &BaseDimensions,
    wm: &WatermarkDimensions,
    offset: (u32, u32),
) -> Anchor {
    let bw = base.width as i32;
    let bh = base.height as i32;
    let ww = wm.width as i32;
    let wh = wm.height as i32;
    let ox = offset.0 as i32;
    let oy = offset.1 as i32;

    match preset {
        AnchorPreset::TopLeft => Anchor::new(ox, oy),
        AnchorPreset::TopCenter => Anchor::new((bw - ww) / 2, oy),
        AnchorPreset::TopRight => Anchor::new(bw - ww - ox, oy),

        AnchorPreset::MiddleLeft => Anchor::new(ox, (bh - wh) / 2),
        AnchorPreset::Center => Anchor::new((bw - ww) / 2, (bh - wh) / 2),
        AnchorPreset::MiddleRight => Anchor::new(bw - ww - ox, (bh - wh) / 2),

        AnchorPreset::BottomLeft => Anchor::new(ox, bh - wh - oy),
        AnchorPreset::BottomCenter => Anchor::new((bw - ww) / 2, bh - wh - oy),
        AnchorPreset::BottomRight => Anchor::new(bw - ww - ox, bh - wh - oy),
    }
}

/// Resolve an anchor from a normalized free position.
///
/// `x = round(norm_x * (bw - ww))`, `y = round(norm_y * (bh - wh))`, in
/// signed arithmetic so an oversized watermark lands at a negative anchor.
pub fn resolve_free(norm: (f32, f32), base: &BaseDimensions, wm: &WatermarkDimensions) -> Anchor {
    let span_x = base.width as i64 - wm.width as i64;
    let span_y = base.height as i64 - wm.height as i64;

    Anchor::new(
        (norm.0 as f64 * span_x as f64).round() as i32,
        (norm.1 as f64 * span_y as f64).round() as i32,
    )
}

/// Resolve an anchor from full placement settings: the free position wins
/// when present, otherwise the preset applies.
pub fn resolve(
    free_pos: Option<(f32, f32)>,
    preset: AnchorPreset,
    offset: (u32, u32),
    base: &BaseDimensions,
    wm: &WatermarkDimensions,
) -> Anchor {
    match free_pos {
        Some(norm) => resolve_free(norm, base, wm),
        None => resolve_preset(preset, base, wm, offset),
    }
}
