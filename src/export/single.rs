//! Single-file export transform: decode, watermark, resize, name, save.
//!
//! Every failure kind (unreadable source, output-directory collision,
//! encode or write error) is caught here and surfaced as an
//! [`ExportOutcome`], so the batch orchestrator never sees a fault.

use std::env;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ImageEncoder as _, RgbaImage};
use tracing::{debug, info, warn};

use crate::settings::{ExportSettings, NamingMode, OutputFormat, WatermarkSettings};
use crate::watermark::apply_watermark;

use super::error::ExportError;
use super::resize::apply_resize;

/// Result of exporting one file: success with the written path, or failure
/// with a descriptive message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub ok: bool,
    /// Output path on success, error message on failure.
    pub detail: String,
}

impl ExportOutcome {
    fn success(path: &Path) -> Self {
        Self {
            ok: true,
            detail: path.display().to_string(),
        }
    }

    fn failure(err: &ExportError) -> Self {
        Self {
            ok: false,
            detail: err.to_string(),
        }
    }
}

/// Watermark and export one file. Never panics, never propagates: all
/// outcomes are representable as `(ok, message)`.
pub fn export_single(
    path: &Path,
    wm: &WatermarkSettings,
    exp: &ExportSettings,
) -> ExportOutcome {
    match export_file(path, wm, exp) {
        Ok(out_path) => {
            info!(input = %path.display(), output = %out_path.display(), "exported");
            ExportOutcome::success(&out_path)
        }
        Err(err) => {
            warn!(input = %path.display(), error = %err, "export failed");
            ExportOutcome::failure(&err)
        }
    }
}

fn export_file(
    path: &Path,
    wm: &WatermarkSettings,
    exp: &ExportSettings,
) -> Result<PathBuf, ExportError> {
    let img = image::open(path).map_err(|e| ExportError::SourceUnreadable {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let marked = apply_watermark(&img, wm).to_rgba8();
    let resized = apply_resize(&marked, exp)?;

    let out_path = output_path(path, exp);

    // Collision check runs before any write, including directory creation.
    if exp.prevent_overwrite {
        let src_dir = absolute(path.parent().unwrap_or_else(|| Path::new("")));
        let out_dir = absolute(&exp.output_dir);
        if src_dir == out_dir {
            return Err(ExportError::OutputCollision(path.to_path_buf()));
        }
    }

    fs::create_dir_all(&exp.output_dir)?;
    save_image(&resized, &out_path, exp)?;

    Ok(out_path)
}

/// Derive the output path: naming mode applied to the input stem, extension
/// taken from the output format regardless of the input extension.
pub fn output_path(input: &Path, exp: &ExportSettings) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name = match exp.naming_mode {
        NamingMode::Keep => stem,
        NamingMode::Prefix => format!("{}{}", exp.prefix, stem),
        NamingMode::Suffix => format!("{}{}", stem, exp.suffix),
    };

    exp.output_dir
        .join(format!("{}.{}", name, exp.format.extension()))
}

/// Lexical absolutization relative to the current directory. Deliberately
/// does not resolve symlinks: the overwrite guard is a directory-level
/// comparison only.
fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().unwrap_or_default().join(path)
    }
}

fn save_image(img: &RgbaImage, out_path: &Path, exp: &ExportSettings) -> Result<(), ExportError> {
    let file = File::create(out_path)?;
    let writer = BufWriter::new(file);

    match exp.format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel: flatten before encoding
            let rgb = DynamicImage::ImageRgba8(img.clone()).to_rgb8();
            let quality = exp.jpeg_quality.clamp(0, 100) as u8;
            debug!(quality, "encoding JPEG");
            JpegEncoder::new_with_quality(writer, quality)
                .encode_image(&rgb)
                .map_err(|e| ExportError::EncodeFailed {
                    format: "JPEG",
                    message: e.to_string(),
                })?;
        }
        OutputFormat::Png => {
            PngEncoder::new(writer)
                .write_image(img.as_raw(), img.width(), img.height(), ColorType::Rgba8)
                .map_err(|e| ExportError::EncodeFailed {
                    format: "PNG",
                    message: e.to_string(),
                })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{TextStyle, WatermarkMode};
    use image::Rgba;

    fn bitmap_text_settings() -> WatermarkSettings {
        WatermarkSettings {
            mode: WatermarkMode::Text,
            text: "WM".to_string(),
            text_style: TextStyle {
                font_path: Some("/nonexistent/font.ttf".into()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn write_source(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(w, h, Rgba([90, 90, 90, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_output_path_suffix_png() {
        let exp = ExportSettings {
            output_dir: PathBuf::from("/out"),
            naming_mode: NamingMode::Suffix,
            suffix: "_watermarked".to_string(),
            format: OutputFormat::Png,
            ..Default::default()
        };
        assert_eq!(
            output_path(Path::new("/in/photo.jpg"), &exp),
            PathBuf::from("/out/photo_watermarked.png")
        );
    }

    #[test]
    fn test_output_path_prefix_jpeg() {
        let exp = ExportSettings {
            output_dir: PathBuf::from("/out"),
            naming_mode: NamingMode::Prefix,
            prefix: "wm_".to_string(),
            format: OutputFormat::Jpeg,
            ..Default::default()
        };
        assert_eq!(
            output_path(Path::new("shot.tiff"), &exp),
            PathBuf::from("/out/wm_shot.jpg")
        );
    }

    #[test]
    fn test_output_path_keep_swaps_extension_only() {
        let exp = ExportSettings {
            output_dir: PathBuf::from("/out"),
            naming_mode: NamingMode::Keep,
            format: OutputFormat::Jpeg,
            ..Default::default()
        };
        assert_eq!(
            output_path(Path::new("/in/scan.png"), &exp),
            PathBuf::from("/out/scan.jpg")
        );
    }

    #[test]
    fn test_export_writes_file() {
        let src_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let src = write_source(src_dir.path(), "photo.png", 64, 48);

        let exp = ExportSettings {
            output_dir: out_dir.path().to_path_buf(),
            format: OutputFormat::Png,
            ..Default::default()
        };
        let outcome = export_single(&src, &bitmap_text_settings(), &exp);
        assert!(outcome.ok, "export failed: {}", outcome.detail);

        let written = out_dir.path().join("photo_watermarked.png");
        assert_eq!(outcome.detail, written.display().to_string());
        let reloaded = image::open(&written).unwrap();
        assert_eq!(reloaded.width(), 64);
        assert_eq!(reloaded.height(), 48);
    }

    #[test]
    fn test_export_resizes_output() {
        let src_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let src = write_source(src_dir.path(), "big.png", 160, 120);

        let exp = ExportSettings {
            output_dir: out_dir.path().to_path_buf(),
            format: OutputFormat::Jpeg,
            resize_mode: crate::settings::ResizeMode::Width,
            resize_value: 80,
            ..Default::default()
        };
        let outcome = export_single(&src, &bitmap_text_settings(), &exp);
        assert!(outcome.ok, "export failed: {}", outcome.detail);

        let reloaded = image::open(out_dir.path().join("big_watermarked.jpg")).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (80, 60));
    }

    #[test]
    fn test_unreadable_source_reports_failure() {
        let out_dir = tempfile::tempdir().unwrap();
        let exp = ExportSettings {
            output_dir: out_dir.path().to_path_buf(),
            ..Default::default()
        };
        let outcome = export_single(
            Path::new("/no/such/image.jpg"),
            &bitmap_text_settings(),
            &exp,
        );
        assert!(!outcome.ok);
        assert!(outcome.detail.contains("image.jpg"));
    }

    #[test]
    fn test_overwrite_guard_rejects_same_directory() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_source(dir.path(), "photo.png", 32, 32);

        let exp = ExportSettings {
            output_dir: dir.path().to_path_buf(),
            prevent_overwrite: true,
            format: OutputFormat::Png,
            naming_mode: NamingMode::Keep,
            ..Default::default()
        };
        let outcome = export_single(&src, &bitmap_text_settings(), &exp);
        assert!(!outcome.ok);
        assert!(outcome.detail.contains("must differ"));
        // Nothing written: the source is the only file in the directory
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_guard_disabled_allows_same_directory() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_source(dir.path(), "photo.png", 32, 32);

        let exp = ExportSettings {
            output_dir: dir.path().to_path_buf(),
            prevent_overwrite: false,
            format: OutputFormat::Png,
            ..Default::default()
        };
        let outcome = export_single(&src, &bitmap_text_settings(), &exp);
        assert!(outcome.ok, "export failed: {}", outcome.detail);
        assert!(dir.path().join("photo_watermarked.png").exists());
    }

    #[test]
    fn test_export_creates_output_directory() {
        let src_dir = tempfile::tempdir().unwrap();
        let out_root = tempfile::tempdir().unwrap();
        let src = write_source(src_dir.path(), "photo.png", 32, 32);

        let nested = out_root.path().join("deep").join("er");
        let exp = ExportSettings {
            output_dir: nested.clone(),
            format: OutputFormat::Png,
            ..Default::default()
        };
        let outcome = export_single(&src, &bitmap_text_settings(), &exp);
        assert!(outcome.ok, "export failed: {}", outcome.detail);
        assert!(nested.join("photo_watermarked.png").exists());
    }

    #[test]
    fn test_jpeg_quality_clamped_not_rejected() {
        let src_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let src = write_source(src_dir.path(), "photo.png", 32, 32);

        let exp = ExportSettings {
            output_dir: out_dir.path().to_path_buf(),
            format: OutputFormat::Jpeg,
            jpeg_quality: 400,
            ..Default::default()
        };
        let outcome = export_single(&src, &bitmap_text_settings(), &exp);
        assert!(outcome.ok, "export failed: {}", outcome.detail);
    }
}
