//! Watermark rendering: anchor resolution, text and image layers, alpha
//! compositing.
//!
//! The pipeline is total by design: font resolution falls back to a built-in
//! bitmap font, a missing watermark image passes the base through unchanged,
//! and out-of-range style values are clamped. Rendering always produces an
//! image.

pub mod compositor;
pub mod font;
pub mod overlay;
pub mod position;
pub mod rotate;
pub mod text;

use image::DynamicImage;
use tracing::debug;

use crate::settings::{WatermarkMode, WatermarkSettings};

// Re-export main types for convenience
pub use compositor::{blend_pixels, Layer};
pub use font::{resolve_font, GlyphMask, ResolvedFont};
pub use overlay::render_image_watermark;
pub use position::{resolve, resolve_free, resolve_preset, Anchor, BaseDimensions, WatermarkDimensions};
pub use rotate::rotate_expand;
pub use text::render_text_watermark;

/// Composite the configured watermark onto `image`, returning a new image.
///
/// The base is converted to RGBA for compositing; encoding back to an
/// output format happens in the export layer.
pub fn apply_watermark(image: &DynamicImage, settings: &WatermarkSettings) -> DynamicImage {
    let base = image.to_rgba8();
    debug!(
        mode = ?settings.mode,
        width = base.width(),
        height = base.height(),
        rotation = settings.rotation,
        "applying watermark"
    );

    let out = match settings.mode {
        WatermarkMode::Text => text::render_text_watermark(&base, settings),
        WatermarkMode::Image => overlay::render_image_watermark(&base, settings),
    };

    DynamicImage::ImageRgba8(out)
}
