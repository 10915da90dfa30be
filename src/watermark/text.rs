//! Text watermark rendering.
//!
//! Builds a transparent base-sized layer containing styled text (fill color,
//! stroke outline, drop shadow), rotates it, and composites it over the base
//! image.
//!
//! Rotation here pivots around the layer center: the full layer is rotated
//! with canvas expansion and the expanded canvas is re-centered onto a fresh
//! base-sized layer. The image-watermark path deliberately does not
//! re-center (see [`super::overlay`]).

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::settings::{opacity_alpha, WatermarkSettings};

use super::compositor::{blend_pixels, Layer};
use super::font::{resolve_font, GlyphMask};
use super::position::{self, BaseDimensions, WatermarkDimensions};
use super::rotate::rotate_expand;

/// Render the configured text watermark over a copy of `base`.
pub fn render_text_watermark(base: &RgbaImage, settings: &WatermarkSettings) -> RgbaImage {
    let style = &settings.text_style;
    let (bw, bh) = (base.width(), base.height());

    let font = resolve_font(style.font_path.as_deref(), style.font_size);
    if font.is_bitmap() {
        debug!("rendering text watermark with bitmap fallback font");
    }

    // Fill mask inside a stroke-extended bounding box; the box is what gets
    // anchored, so measurement accounts for the stroke width.
    let fill_mask = font.rasterize(&settings.text).pad(style.stroke_width);
    let stroke_mask = if style.stroke_width > 0 {
        Some(fill_mask.dilate(style.stroke_width))
    } else {
        None
    };

    let anchor = position::resolve(
        settings.free_pos,
        settings.position,
        settings.offset,
        &BaseDimensions {
            width: bw,
            height: bh,
        },
        &WatermarkDimensions {
            width: fill_mask.width(),
            height: fill_mask.height(),
        },
    );

    let alpha = opacity_alpha(style.opacity);
    let mut layer = Layer::new(bw, bh);

    // Shadow first, beneath everything: the whole shape (stroke included)
    // in black at the shadow offset.
    if style.shadow {
        let shape = stroke_mask.as_ref().unwrap_or(&fill_mask);
        stamp_mask(
            &mut layer,
            shape,
            anchor.x + style.shadow_offset.0,
            anchor.y + style.shadow_offset.1,
            [0, 0, 0],
            alpha,
        );
    }

    if let Some(stroke) = &stroke_mask {
        stamp_mask(&mut layer, stroke, anchor.x, anchor.y, style.stroke_color, alpha);
    }
    stamp_mask(&mut layer, &fill_mask, anchor.x, anchor.y, style.color, alpha);

    let rotation = settings.normalized_rotation();
    if rotation != 0.0 {
        let rotated = rotate_expand(layer.as_image(), rotation);
        let mut recentered = Layer::new(bw, bh);
        recentered.blit(
            &rotated,
            (bw as i32 - rotated.width() as i32) / 2,
            (bh as i32 - rotated.height() as i32) / 2,
        );
        layer = recentered;
    }

    layer.composite_over(base)
}

/// Stamp a coverage mask onto the layer at `(x, y)` in the given color.
/// Per-pixel alpha is `coverage * alpha`, blended with "over" so overlapping
/// stamps accumulate like anti-aliased draws.
fn stamp_mask(layer: &mut Layer, mask: &GlyphMask, x: i32, y: i32, color: [u8; 3], alpha: u8) {
    let canvas = layer.as_image_mut();
    let (cw, ch) = (canvas.width() as i32, canvas.height() as i32);

    for my in 0..mask.height() {
        for mx in 0..mask.width() {
            let coverage = mask.get(mx, my);
            if coverage <= 0.0 {
                continue;
            }

            let cx = x + mx as i32;
            let cy = y + my as i32;
            if cx < 0 || cy < 0 || cx >= cw || cy >= ch {
                continue;
            }

            let px_alpha = (coverage * alpha as f32).round() as u8;
            let fg = Rgba([color[0], color[1], color[2], px_alpha]);
            let bg = *canvas.get_pixel(cx as u32, cy as u32);
            canvas.put_pixel(cx as u32, cy as u32, blend_pixels(bg, fg));
        }
    }
}
