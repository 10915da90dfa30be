//! Image watermark rendering.
//!
//! Loads an external watermark image, scales it relative to the base image's
//! shorter side, adjusts its alpha channel, rotates it, and composites it at
//! the resolved anchor.
//!
//! A missing or unreadable watermark file is a soft no-op: the base comes
//! back unchanged, never an error. Rotation here keeps the rotated bitmap's
//! own top-left as the origin fed to anchor resolution — there is no
//! re-centering step, unlike the text path in [`super::text`].

use image::RgbaImage;
use tracing::{debug, warn};

use crate::resample::resize_rgba;
use crate::settings::WatermarkSettings;

use super::compositor::Layer;
use super::position::{self, BaseDimensions, WatermarkDimensions};
use super::rotate::rotate_expand;

/// Render the configured image watermark over a copy of `base`.
pub fn render_image_watermark(base: &RgbaImage, settings: &WatermarkSettings) -> RgbaImage {
    let style = &settings.image_style;
    let (bw, bh) = (base.width(), base.height());

    let Some(path) = &style.path else {
        return base.clone();
    };

    let mut wm = match image::open(path) {
        Ok(img) => img.to_rgba8(),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "watermark image unreadable, skipping");
            return base.clone();
        }
    };

    // Scale so the watermark width equals a fraction of the base's shorter
    // side; height follows the source aspect ratio.
    let target_w = (bw.min(bh) as f32 * style.clamped_scale()).round() as u32;
    let ratio = target_w as f64 / wm.width() as f64;
    let new_w = target_w.max(1);
    let new_h = ((wm.height() as f64 * ratio) as u32).max(1);
    wm = match resize_rgba(&wm, new_w, new_h) {
        Ok(resized) => resized,
        Err(err) => {
            warn!(error = %err, "watermark scaling failed, skipping watermark");
            return base.clone();
        }
    };

    // Compounds with transparency already present in the source image
    let opacity = style.opacity.clamp(0, 100);
    if opacity < 100 {
        let factor = opacity as f32 / 100.0;
        for px in wm.pixels_mut() {
            px[3] = (px[3] as f32 * factor).round().clamp(0.0, 255.0) as u8;
        }
    }

    let rotation = settings.normalized_rotation();
    if rotation != 0.0 {
        wm = rotate_expand(&wm, rotation);
    }

    let anchor = position::resolve(
        settings.free_pos,
        settings.position,
        settings.offset,
        &BaseDimensions {
            width: bw,
            height: bh,
        },
        &WatermarkDimensions {
            width: wm.width(),
            height: wm.height(),
        },
    );

    let mut layer = Layer::new(bw, bh);
    layer.blit(&wm, anchor.x, anchor.y);
    layer.composite_over(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{AnchorPreset, ImageStyle, WatermarkMode};
    use image::Rgba;
    use std::io::Write;

    fn base(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 255]))
    }

    fn write_png(dir: &std::path::Path, name: &str, img: &RgbaImage) -> std::path::PathBuf {
        let path = dir.join(name);
        img.save(&path).unwrap();
        path
    }

    fn image_settings(path: Option<std::path::PathBuf>, scale: f32) -> WatermarkSettings {
        WatermarkSettings {
            mode: WatermarkMode::Image,
            image_style: ImageStyle {
                path,
                scale,
                opacity: 100,
            },
            position: AnchorPreset::TopLeft,
            offset: (0, 0),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_path_is_noop() {
        let img = base(50, 50);
        let out = render_image_watermark(&img, &image_settings(None, 0.25));
        assert_eq!(out, img);
    }

    #[test]
    fn test_unreadable_file_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("not_an_image.png");
        let mut f = std::fs::File::create(&bogus).unwrap();
        f.write_all(b"not image data").unwrap();

        let img = base(50, 50);
        let out = render_image_watermark(&img, &image_settings(Some(bogus), 0.25));
        assert_eq!(out, img);
    }

    #[test]
    fn test_watermark_scaled_to_shorter_side() {
        let dir = tempfile::tempdir().unwrap();
        let wm = RgbaImage::from_pixel(40, 20, Rgba([255, 0, 0, 255]));
        let path = write_png(dir.path(), "wm.png", &wm);

        // Base 200x100: shorter side 100, scale 0.5 -> watermark width 50,
        // height follows aspect (50 * 20/40 = 25)
        let img = base(200, 100);
        let out = render_image_watermark(&img, &image_settings(Some(path), 0.5));

        // Top-left anchored: pixel inside 50x25 is red, outside is black
        assert!(out.get_pixel(10, 10)[0] > 200);
        assert_eq!(out.get_pixel(60, 10)[0], 0);
        assert_eq!(out.get_pixel(10, 30)[0], 0);
    }

    #[test]
    fn test_opacity_multiplies_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let wm = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        let path = write_png(dir.path(), "wm.png", &wm);

        let img = base(40, 40);
        let mut settings = image_settings(Some(path), 0.25);
        settings.image_style.opacity = 50;
        let out = render_image_watermark(&img, &settings);

        // 50% white over black lands near mid-gray
        let px = out.get_pixel(2, 2);
        assert!(px[0] > 100 && px[0] < 160);
    }

    #[test]
    fn test_opacity_compounds_with_source_alpha() {
        let dir = tempfile::tempdir().unwrap();
        // Source watermark already half transparent
        let wm = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 128]));
        let path = write_png(dir.path(), "wm.png", &wm);

        let img = base(40, 40);
        let mut settings = image_settings(Some(path), 0.25);
        settings.image_style.opacity = 50;
        let out = render_image_watermark(&img, &settings);

        // Effective alpha ~25%: darker than the 50%-over-black case
        let px = out.get_pixel(2, 2);
        assert!(px[0] > 40 && px[0] < 100);
    }

    #[test]
    fn test_rotation_feeds_rotated_size_to_anchor() {
        let dir = tempfile::tempdir().unwrap();
        let wm = RgbaImage::from_pixel(40, 10, Rgba([0, 255, 0, 255]));
        let path = write_png(dir.path(), "wm.png", &wm);

        let img = base(100, 100);
        let mut settings = image_settings(Some(path), 0.4);
        settings.position = AnchorPreset::BottomRight;
        settings.offset = (0, 0);
        settings.rotation = 90.0;
        let out = render_image_watermark(&img, &settings);

        // Scaled to 40x10 then rotated 90 degrees -> roughly 10x40 sprite
        // anchored bottom-right; green must appear near that corner.
        let corner = out.get_pixel(95, 80);
        assert!(corner[1] > 200, "expected rotated watermark near bottom-right");
    }

    #[test]
    fn test_free_position_overrides_preset() {
        let dir = tempfile::tempdir().unwrap();
        let wm = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        let path = write_png(dir.path(), "wm.png", &wm);

        let img = base(100, 100);
        let mut settings = image_settings(Some(path), 0.1);
        settings.position = AnchorPreset::BottomRight;
        settings.free_pos = Some((0.0, 0.0));
        let out = render_image_watermark(&img, &settings);

        assert!(out.get_pixel(2, 2)[0] > 200);
        assert_eq!(out.get_pixel(95, 95)[0], 0);
    }
}
