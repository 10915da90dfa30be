//! Watermark and export configuration types.
//!
//! Settings are mutable value records owned by the caller (a GUI shell or a
//! script). The core never stores them; render and export calls borrow a
//! snapshot for the duration of one operation. Out-of-range numeric values
//! are clamped at the point of use, never rejected.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod color;

pub use color::parse_color;

// Default values
fn default_font_size() -> u32 {
    36
}

fn default_text_color() -> [u8; 3] {
    [255, 255, 255]
}

fn default_opacity() -> i32 {
    80
}

fn default_shadow_offset() -> (i32, i32) {
    (2, 2)
}

fn default_scale() -> f32 {
    0.25
}

fn default_text() -> String {
    "Sample Watermark".to_string()
}

fn default_offset() -> (u32, u32) {
    (10, 10)
}

fn default_prefix() -> String {
    "wm_".to_string()
}

fn default_suffix() -> String {
    "_watermarked".to_string()
}

fn default_jpeg_quality() -> i32 {
    90
}

fn default_true() -> bool {
    true
}

/// Clamp an opacity percentage into [0, 100] and convert it to an 8-bit
/// alpha value, `round(255 * opacity / 100)`.
pub fn opacity_alpha(opacity: i32) -> u8 {
    let pct = opacity.clamp(0, 100) as f32;
    (255.0 * pct / 100.0).round() as u8
}

/// Watermark kind selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkMode {
    #[default]
    Text,
    Image,
}

impl FromStr for WatermarkMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(WatermarkMode::Text),
            "image" => Ok(WatermarkMode::Image),
            _ => Err(format!("unknown watermark mode: {}", s)),
        }
    }
}

/// Named anchor region for watermark placement.
///
/// Three rows by three columns. `BottomRight` doubles as the fallback when a
/// serialized value cannot be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorPreset {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    Center,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    #[default]
    BottomRight,
}

impl AnchorPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::MiddleLeft => "middle-left",
            Self::Center => "center",
            Self::MiddleRight => "middle-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
        }
    }
}

impl FromStr for AnchorPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "top-left" => Ok(Self::TopLeft),
            "top-center" => Ok(Self::TopCenter),
            "top-right" => Ok(Self::TopRight),
            "middle-left" => Ok(Self::MiddleLeft),
            "center" => Ok(Self::Center),
            "middle-right" => Ok(Self::MiddleRight),
            "bottom-left" => Ok(Self::BottomLeft),
            "bottom-center" => Ok(Self::BottomCenter),
            "bottom-right" => Ok(Self::BottomRight),
            _ => Err(format!("unknown position preset: {}", s)),
        }
    }
}

/// How the output file name is derived from the input file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingMode {
    Keep,
    Prefix,
    #[default]
    Suffix,
}

impl FromStr for NamingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keep" => Ok(NamingMode::Keep),
            "prefix" => Ok(NamingMode::Prefix),
            "suffix" => Ok(NamingMode::Suffix),
            _ => Err(format!("unknown naming mode: {}", s)),
        }
    }
}

/// Output image format. The output extension follows the format, not the
/// input file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

/// Post-composite resize behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    #[default]
    None,
    Width,
    Height,
    Percent,
}

impl FromStr for ResizeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(ResizeMode::None),
            "width" => Ok(ResizeMode::Width),
            "height" => Ok(ResizeMode::Height),
            "percent" => Ok(ResizeMode::Percent),
            _ => Err(format!("unknown resize mode: {}", s)),
        }
    }
}

/// Appearance of a text watermark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    /// Path to a .ttf/.otf font. `None` falls through the default chain.
    #[serde(default)]
    pub font_path: Option<PathBuf>,

    /// Font size in pixels (default: 36)
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Fill color as an RGB triple (default: white)
    #[serde(default = "default_text_color")]
    pub color: [u8; 3],

    /// Opacity percentage, clamped into [0, 100] at use (default: 80)
    #[serde(default = "default_opacity")]
    pub opacity: i32,

    /// Outline stroke width in pixels (default: 0, no stroke)
    #[serde(default)]
    pub stroke_width: u32,

    /// Outline stroke color (default: black)
    #[serde(default)]
    pub stroke_color: [u8; 3],

    /// Draw a drop shadow behind the text (default: off)
    #[serde(default)]
    pub shadow: bool,

    /// Shadow displacement in pixels, signed (default: (2, 2))
    #[serde(default = "default_shadow_offset")]
    pub shadow_offset: (i32, i32),
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_path: None,
            font_size: default_font_size(),
            color: default_text_color(),
            opacity: default_opacity(),
            stroke_width: 0,
            stroke_color: [0, 0, 0],
            shadow: false,
            shadow_offset: default_shadow_offset(),
        }
    }
}

/// Appearance of an image watermark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageStyle {
    /// Path to the watermark image. `None` or an unreadable file makes the
    /// image watermark a no-op.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Scale factor relative to the base image's shorter side, clamped into
    /// [0.01, 5.0] at use (default: 0.25)
    #[serde(default = "default_scale")]
    pub scale: f32,

    /// Opacity percentage, clamped into [0, 100] at use (default: 80)
    #[serde(default = "default_opacity")]
    pub opacity: i32,
}

impl ImageStyle {
    /// The scale factor clamped into its working range.
    pub fn clamped_scale(&self) -> f32 {
        self.scale.clamp(0.01, 5.0)
    }
}

impl Default for ImageStyle {
    fn default() -> Self {
        Self {
            path: None,
            scale: default_scale(),
            opacity: default_opacity(),
        }
    }
}

/// Full watermark configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkSettings {
    #[serde(default)]
    pub mode: WatermarkMode,

    /// Text content for text mode
    #[serde(default = "default_text")]
    pub text: String,

    #[serde(default)]
    pub text_style: TextStyle,

    #[serde(default)]
    pub image_style: ImageStyle,

    /// Rotation in degrees, any real value, applied mod 360
    #[serde(default)]
    pub rotation: f32,

    /// Placement preset, used when `free_pos` is unset
    #[serde(default)]
    pub position: AnchorPreset,

    /// Padding from the edge in pixels for preset placement
    #[serde(default = "default_offset")]
    pub offset: (u32, u32),

    /// Normalized free position in [0, 1] x [0, 1]. When set, overrides the
    /// preset entirely; clearing it reverts to preset placement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_pos: Option<(f32, f32)>,
}

impl Default for WatermarkSettings {
    fn default() -> Self {
        Self {
            mode: WatermarkMode::Text,
            text: default_text(),
            text_style: TextStyle::default(),
            image_style: ImageStyle::default(),
            rotation: 0.0,
            position: AnchorPreset::BottomRight,
            offset: default_offset(),
            free_pos: None,
        }
    }
}

impl WatermarkSettings {
    /// Rotation normalized into [0, 360).
    pub fn normalized_rotation(&self) -> f32 {
        self.rotation.rem_euclid(360.0)
    }
}

/// Export behavior for a single file or a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Directory the output files are written to
    #[serde(default)]
    pub output_dir: PathBuf,

    /// Reject exports whose output directory equals the source directory
    #[serde(default = "default_true")]
    pub prevent_overwrite: bool,

    #[serde(default)]
    pub naming_mode: NamingMode,

    #[serde(default = "default_prefix")]
    pub prefix: String,

    #[serde(default = "default_suffix")]
    pub suffix: String,

    #[serde(default)]
    pub format: OutputFormat,

    /// JPEG quality, clamped into [0, 100] at encode time (default: 90)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: i32,

    #[serde(default)]
    pub resize_mode: ResizeMode,

    /// Pixels for width/height modes, percentage for percent mode. Values
    /// <= 0 disable the resize step.
    #[serde(default)]
    pub resize_value: i32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::new(),
            prevent_overwrite: true,
            naming_mode: NamingMode::Suffix,
            prefix: default_prefix(),
            suffix: default_suffix(),
            format: OutputFormat::Jpeg,
            jpeg_quality: default_jpeg_quality(),
            resize_mode: ResizeMode::None,
            resize_value: 0,
        }
    }
}

/// File extensions accepted as batch inputs.
pub const SUPPORTED_INPUT_EXTS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

/// Whether a path looks like a supported input image, by extension.
pub fn is_supported_input(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let lower = e.to_lowercase();
            SUPPORTED_INPUT_EXTS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_opacity_alpha_clamps_and_rounds() {
        assert_eq!(opacity_alpha(0), 0);
        assert_eq!(opacity_alpha(100), 255);
        assert_eq!(opacity_alpha(150), 255);
        assert_eq!(opacity_alpha(-20), 0);
        // round(255 * 80 / 100) = round(204.0)
        assert_eq!(opacity_alpha(80), 204);
        // round(255 * 50 / 100) = round(127.5) = 128
        assert_eq!(opacity_alpha(50), 128);
    }

    #[test]
    fn test_scale_clamped_into_range() {
        let mut style = ImageStyle {
            scale: 9.0,
            ..Default::default()
        };
        assert_eq!(style.clamped_scale(), 5.0);

        style.scale = 0.0;
        assert_eq!(style.clamped_scale(), 0.01);

        style.scale = 0.25;
        assert_eq!(style.clamped_scale(), 0.25);
    }

    #[test]
    fn test_rotation_normalized_mod_360() {
        let mut wm = WatermarkSettings {
            rotation: 370.0,
            ..Default::default()
        };
        assert!((wm.normalized_rotation() - 10.0).abs() < 1e-4);

        wm.rotation = -45.0;
        assert!((wm.normalized_rotation() - 315.0).abs() < 1e-4);

        wm.rotation = 720.0;
        assert!(wm.normalized_rotation().abs() < 1e-4);
    }

    #[test]
    fn test_anchor_preset_serde_kebab_case() {
        let json = serde_json::to_string(&AnchorPreset::BottomRight).unwrap();
        assert_eq!(json, "\"bottom-right\"");

        let back: AnchorPreset = serde_json::from_str("\"middle-left\"").unwrap();
        assert_eq!(back, AnchorPreset::MiddleLeft);
    }

    #[test]
    fn test_anchor_preset_from_str() {
        assert_eq!(
            "top-center".parse::<AnchorPreset>().unwrap(),
            AnchorPreset::TopCenter
        );
        assert!("upper-left".parse::<AnchorPreset>().is_err());
    }

    #[test]
    fn test_output_format_extension() {
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::Png.extension(), "png");
        assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
    }

    #[test]
    fn test_defaults_match_documented_values() {
        let wm = WatermarkSettings::default();
        assert_eq!(wm.mode, WatermarkMode::Text);
        assert_eq!(wm.text, "Sample Watermark");
        assert_eq!(wm.text_style.font_size, 36);
        assert_eq!(wm.text_style.opacity, 80);
        assert_eq!(wm.position, AnchorPreset::BottomRight);
        assert_eq!(wm.offset, (10, 10));
        assert!(wm.free_pos.is_none());

        let exp = ExportSettings::default();
        assert!(exp.prevent_overwrite);
        assert_eq!(exp.naming_mode, NamingMode::Suffix);
        assert_eq!(exp.prefix, "wm_");
        assert_eq!(exp.suffix, "_watermarked");
        assert_eq!(exp.jpeg_quality, 90);
        assert_eq!(exp.resize_mode, ResizeMode::None);
    }

    #[test]
    fn test_settings_json_roundtrip() {
        let wm = WatermarkSettings {
            free_pos: Some((0.5, 0.25)),
            rotation: 30.0,
            ..Default::default()
        };
        let s = serde_json::to_string(&wm).unwrap();
        let back: WatermarkSettings = serde_json::from_str(&s).unwrap();
        assert_eq!(back.free_pos, Some((0.5, 0.25)));
        assert_eq!(back.rotation, 30.0);
    }

    #[test]
    fn test_free_pos_omitted_when_unset() {
        let wm = WatermarkSettings::default();
        let s = serde_json::to_string(&wm).unwrap();
        assert!(!s.contains("free_pos"));
    }

    #[test]
    fn test_supported_input_extensions() {
        assert!(is_supported_input(Path::new("photo.jpg")));
        assert!(is_supported_input(Path::new("photo.JPEG")));
        assert!(is_supported_input(Path::new("scan.tiff")));
        assert!(is_supported_input(Path::new("pixel.bmp")));
        assert!(!is_supported_input(Path::new("clip.gif")));
        assert!(!is_supported_input(Path::new("noext")));
    }
}
