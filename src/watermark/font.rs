//! Font resolution and text rasterization.
//!
//! Resolution walks a fallback chain that never fails: an explicit font path,
//! then a list of platform-default font files, and finally a built-in
//! fixed-size bitmap font. Rendering therefore always has a usable font.
//!
//! Text is rasterized to a [`GlyphMask`] — a grayscale coverage buffer — so
//! the caller can stamp the same shape several times (shadow, stroke, fill)
//! with different colors.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};
use tracing::debug;

/// Extra pixels added around measured text, matching the rasterizer's
/// rounding slack.
const MEASURE_PADDING: u32 = 2;

/// Grayscale coverage buffer produced by rasterizing a string.
#[derive(Debug, Clone)]
pub struct GlyphMask {
    width: u32,
    height: u32,
    coverage: Vec<f32>,
}

impl GlyphMask {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0.0; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Coverage at `(x, y)`, 0.0 outside the mask.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.coverage[(y * self.width + x) as usize]
    }

    fn accumulate(&mut self, x: i32, y: i32, c: f32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = (y as u32 * self.width + x as u32) as usize;
        self.coverage[idx] = self.coverage[idx].max(c);
    }

    /// Copy this mask into a larger one with `margin` transparent pixels on
    /// every side.
    pub fn pad(&self, margin: u32) -> GlyphMask {
        if margin == 0 {
            return self.clone();
        }
        let mut out = GlyphMask::new(self.width + 2 * margin, self.height + 2 * margin);
        for y in 0..self.height {
            for x in 0..self.width {
                let c = self.get(x, y);
                if c > 0.0 {
                    out.accumulate((x + margin) as i32, (y + margin) as i32, c);
                }
            }
        }
        out
    }

    /// Morphological dilation by a disc of the given radius. Grows the
    /// covered shape outward, which is how stroke outlines are produced.
    pub fn dilate(&self, radius: u32) -> GlyphMask {
        if radius == 0 {
            return self.clone();
        }
        let r = radius as i32;
        let mut out = GlyphMask::new(self.width, self.height);
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let mut best = 0.0f32;
                for dy in -r..=r {
                    for dx in -r..=r {
                        if dx * dx + dy * dy > r * r {
                            continue;
                        }
                        let sx = x + dx;
                        let sy = y + dy;
                        if sx >= 0 && sy >= 0 {
                            best = best.max(self.get(sx as u32, sy as u32));
                        }
                    }
                }
                out.accumulate(x, y, best);
            }
        }
        out
    }
}

/// A font usable for measuring and rasterizing text. Either an outline font
/// loaded from disk or the built-in bitmap fallback.
pub enum ResolvedFont {
    Outline(Box<OutlineFont>),
    Bitmap(BitmapFont),
}

impl ResolvedFont {
    /// Bounding box of the rendered string, without stroke accounting.
    pub fn measure(&self, text: &str) -> (u32, u32) {
        match self {
            Self::Outline(f) => f.measure(text),
            Self::Bitmap(f) => f.measure(text),
        }
    }

    /// Rasterize the string into a coverage mask of its measured size.
    pub fn rasterize(&self, text: &str) -> GlyphMask {
        match self {
            Self::Outline(f) => f.rasterize(text),
            Self::Bitmap(f) => f.rasterize(text),
        }
    }

    pub fn is_bitmap(&self) -> bool {
        matches!(self, Self::Bitmap(_))
    }
}

/// Resolve a font by size. Tries `path` first, then the platform-default
/// candidates, and falls back to the built-in bitmap font. Never fails.
pub fn resolve_font(path: Option<&Path>, size: u32) -> ResolvedFont {
    if let Some(p) = path {
        if let Some(f) = load_outline(p, size) {
            return f;
        }
        debug!(path = %p.display(), "configured font not usable, trying defaults");
    }

    for candidate in default_font_candidates() {
        if let Some(f) = load_outline(&candidate, size) {
            debug!(path = %candidate.display(), "using platform default font");
            return f;
        }
    }

    debug!("no outline font available, using built-in bitmap font");
    ResolvedFont::Bitmap(BitmapFont)
}

fn load_outline(path: &Path, size: u32) -> Option<ResolvedFont> {
    let bytes = fs::read(path).ok()?;
    let font = FontVec::try_from_vec(bytes).ok()?;
    Some(ResolvedFont::Outline(Box::new(OutlineFont {
        font,
        scale: PxScale::from(size.max(1) as f32),
    })))
}

/// Platform-default font files probed when no explicit path works.
fn default_font_candidates() -> Vec<PathBuf> {
    let windir = env::var("WINDIR").unwrap_or_else(|_| "C:/Windows".to_string());
    vec![
        PathBuf::from("arial.ttf"),
        Path::new(&windir).join("Fonts").join("arial.ttf"),
        PathBuf::from("/System/Library/Fonts/Supplemental/Arial.ttf"),
        PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
    ]
}

/// An outline (.ttf/.otf) font at a fixed pixel scale.
pub struct OutlineFont {
    font: FontVec,
    scale: PxScale,
}

impl OutlineFont {
    fn measure(&self, text: &str) -> (u32, u32) {
        let scaled = self.font.as_scaled(self.scale);

        let mut width = 0.0f32;
        let mut prev: Option<GlyphId> = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(p) = prev {
                width += scaled.kern(p, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }

        let height = scaled.height();
        (
            width.ceil() as u32 + MEASURE_PADDING,
            height.ceil() as u32 + MEASURE_PADDING,
        )
    }

    fn rasterize(&self, text: &str) -> GlyphMask {
        let (w, h) = self.measure(text);
        let mut mask = GlyphMask::new(w, h);

        let scaled = self.font.as_scaled(self.scale);
        let baseline = scaled.ascent();

        let mut cursor = 0.0f32;
        let mut prev: Option<GlyphId> = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(p) = prev {
                cursor += scaled.kern(p, id);
            }

            let glyph = id.with_scale_and_position(self.scale, point(cursor, baseline));
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|px, py, coverage| {
                    mask.accumulate(
                        px as i32 + bounds.min.x as i32,
                        py as i32 + bounds.min.y as i32,
                        coverage,
                    );
                });
            }

            cursor += scaled.h_advance(id);
            prev = Some(id);
        }

        mask
    }
}

/// The built-in fixed-size bitmap font: an 8x8 cell per printable ASCII
/// character, independent of the configured font size.
pub struct BitmapFont;

const BITMAP_CELL: u32 = 8;

impl BitmapFont {
    fn measure(&self, text: &str) -> (u32, u32) {
        let cols = text.chars().count() as u32;
        (cols * BITMAP_CELL, BITMAP_CELL)
    }

    fn rasterize(&self, text: &str) -> GlyphMask {
        let (w, h) = self.measure(text);
        let mut mask = GlyphMask::new(w.max(1), h);

        for (i, c) in text.chars().enumerate() {
            let glyph = bitmap_glyph(c);
            let origin_x = i as u32 * BITMAP_CELL;
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..8u32 {
                    // Bit 0 of each row byte is the leftmost pixel
                    if bits & (1 << col) != 0 {
                        mask.accumulate((origin_x + col) as i32, row as i32, 1.0);
                    }
                }
            }
        }

        mask
    }
}

fn bitmap_glyph(c: char) -> &'static [u8; 8] {
    let code = c as u32;
    if (0x20..=0x7E).contains(&code) {
        &BITMAP_GLYPHS[(code - 0x20) as usize]
    } else {
        // Anything outside printable ASCII renders as '?'
        &BITMAP_GLYPHS[(b'?' - 0x20) as usize]
    }
}

// Classic public-domain 8x8 ASCII glyph set (0x20..=0x7E). Bit 0 of each row
// byte is the leftmost pixel of that row.
#[rustfmt::skip]
const BITMAP_GLYPHS: [[u8; 8]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x18, 0x3C, 0x3C, 0x18, 0x18, 0x00, 0x18, 0x00], // '!'
    [0x36, 0x36, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // '"'
    [0x36, 0x36, 0x7F, 0x36, 0x7F, 0x36, 0x36, 0x00], // '#'
    [0x0C, 0x3E, 0x03, 0x1E, 0x30, 0x1F, 0x0C, 0x00], // '$'
    [0x00, 0x63, 0x33, 0x18, 0x0C, 0x66, 0x63, 0x00], // '%'
    [0x1C, 0x36, 0x1C, 0x6E, 0x3B, 0x33, 0x6E, 0x00], // '&'
    [0x06, 0x06, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00], // '\''
    [0x18, 0x0C, 0x06, 0x06, 0x06, 0x0C, 0x18, 0x00], // '('
    [0x06, 0x0C, 0x18, 0x18, 0x18, 0x0C, 0x06, 0x00], // ')'
    [0x00, 0x66, 0x3C, 0xFF, 0x3C, 0x66, 0x00, 0x00], // '*'
    [0x00, 0x0C, 0x0C, 0x3F, 0x0C, 0x0C, 0x00, 0x00], // '+'
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C, 0x06], // ','
    [0x00, 0x00, 0x00, 0x3F, 0x00, 0x00, 0x00, 0x00], // '-'
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C, 0x00], // '.'
    [0x60, 0x30, 0x18, 0x0C, 0x06, 0x03, 0x01, 0x00], // '/'
    [0x3E, 0x63, 0x73, 0x7B, 0x6F, 0x67, 0x3E, 0x00], // '0'
    [0x0C, 0x0E, 0x0C, 0x0C, 0x0C, 0x0C, 0x3F, 0x00], // '1'
    [0x1E, 0x33, 0x30, 0x1C, 0x06, 0x33, 0x3F, 0x00], // '2'
    [0x1E, 0x33, 0x30, 0x1C, 0x30, 0x33, 0x1E, 0x00], // '3'
    [0x38, 0x3C, 0x36, 0x33, 0x7F, 0x30, 0x78, 0x00], // '4'
    [0x3F, 0x03, 0x1F, 0x30, 0x30, 0x33, 0x1E, 0x00], // '5'
    [0x1C, 0x06, 0x03, 0x1F, 0x33, 0x33, 0x1E, 0x00], // '6'
    [0x3F, 0x33, 0x30, 0x18, 0x0C, 0x0C, 0x0C, 0x00], // '7'
    [0x1E, 0x33, 0x33, 0x1E, 0x33, 0x33, 0x1E, 0x00], // '8'
    [0x1E, 0x33, 0x33, 0x3E, 0x30, 0x18, 0x0E, 0x00], // '9'
    [0x00, 0x0C, 0x0C, 0x00, 0x00, 0x0C, 0x0C, 0x00], // ':'
    [0x00, 0x0C, 0x0C, 0x00, 0x00, 0x0C, 0x0C, 0x06], // ';'
    [0x18, 0x0C, 0x06, 0x03, 0x06, 0x0C, 0x18, 0x00], // '<'
    [0x00, 0x00, 0x3F, 0x00, 0x00, 0x3F, 0x00, 0x00], // '='
    [0x06, 0x0C, 0x18, 0x30, 0x18, 0x0C, 0x06, 0x00], // '>'
    [0x1E, 0x33, 0x30, 0x18, 0x0C, 0x00, 0x0C, 0x00], // '?'
    [0x3E, 0x63, 0x7B, 0x7B, 0x7B, 0x03, 0x1E, 0x00], // '@'
    [0x0C, 0x1E, 0x33, 0x33, 0x3F, 0x33, 0x33, 0x00], // 'A'
    [0x3F, 0x66, 0x66, 0x3E, 0x66, 0x66, 0x3F, 0x00], // 'B'
    [0x3C, 0x66, 0x03, 0x03, 0x03, 0x66, 0x3C, 0x00], // 'C'
    [0x1F, 0x36, 0x66, 0x66, 0x66, 0x36, 0x1F, 0x00], // 'D'
    [0x7F, 0x46, 0x16, 0x1E, 0x16, 0x46, 0x7F, 0x00], // 'E'
    [0x7F, 0x46, 0x16, 0x1E, 0x16, 0x06, 0x0F, 0x00], // 'F'
    [0x3C, 0x66, 0x03, 0x03, 0x73, 0x66, 0x7C, 0x00], // 'G'
    [0x33, 0x33, 0x33, 0x3F, 0x33, 0x33, 0x33, 0x00], // 'H'
    [0x1E, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0x1E, 0x00], // 'I'
    [0x78, 0x30, 0x30, 0x30, 0x33, 0x33, 0x1E, 0x00], // 'J'
    [0x67, 0x66, 0x36, 0x1E, 0x36, 0x66, 0x67, 0x00], // 'K'
    [0x0F, 0x06, 0x06, 0x06, 0x46, 0x66, 0x7F, 0x00], // 'L'
    [0x63, 0x77, 0x7F, 0x7F, 0x6B, 0x63, 0x63, 0x00], // 'M'
    [0x63, 0x67, 0x6F, 0x7B, 0x73, 0x63, 0x63, 0x00], // 'N'
    [0x1C, 0x36, 0x63, 0x63, 0x63, 0x36, 0x1C, 0x00], // 'O'
    [0x3F, 0x66, 0x66, 0x3E, 0x06, 0x06, 0x0F, 0x00], // 'P'
    [0x1E, 0x33, 0x33, 0x33, 0x3B, 0x1E, 0x38, 0x00], // 'Q'
    [0x3F, 0x66, 0x66, 0x3E, 0x36, 0x66, 0x67, 0x00], // 'R'
    [0x1E, 0x33, 0x07, 0x0E, 0x38, 0x33, 0x1E, 0x00], // 'S'
    [0x3F, 0x2D, 0x0C, 0x0C, 0x0C, 0x0C, 0x1E, 0x00], // 'T'
    [0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x3F, 0x00], // 'U'
    [0x33, 0x33, 0x33, 0x33, 0x33, 0x1E, 0x0C, 0x00], // 'V'
    [0x63, 0x63, 0x63, 0x6B, 0x7F, 0x77, 0x63, 0x00], // 'W'
    [0x63, 0x63, 0x36, 0x1C, 0x1C, 0x36, 0x63, 0x00], // 'X'
    [0x33, 0x33, 0x33, 0x1E, 0x0C, 0x0C, 0x1E, 0x00], // 'Y'
    [0x7F, 0x63, 0x31, 0x18, 0x4C, 0x66, 0x7F, 0x00], // 'Z'
    [0x1E, 0x06, 0x06, 0x06, 0x06, 0x06, 0x1E, 0x00], // '['
    [0x03, 0x06, 0x0C, 0x18, 0x30, 0x60, 0x40, 0x00], // '\\'
    [0x1E, 0x18, 0x18, 0x18, 0x18, 0x18, 0x1E, 0x00], // ']'
    [0x08, 0x1C, 0x36, 0x63, 0x00, 0x00, 0x00, 0x00], // '^'
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF], // '_'
    [0x0C, 0x0C, 0x18, 0x00, 0x00, 0x00, 0x00, 0x00], // '`'
    [0x00, 0x00, 0x1E, 0x30, 0x3E, 0x33, 0x6E, 0x00], // 'a'
    [0x07, 0x06, 0x06, 0x3E, 0x66, 0x66, 0x3B, 0x00], // 'b'
    [0x00, 0x00, 0x1E, 0x33, 0x03, 0x33, 0x1E, 0x00], // 'c'
    [0x38, 0x30, 0x30, 0x3E, 0x33, 0x33, 0x6E, 0x00], // 'd'
    [0x00, 0x00, 0x1E, 0x33, 0x3F, 0x03, 0x1E, 0x00], // 'e'
    [0x1C, 0x36, 0x06, 0x0F, 0x06, 0x06, 0x0F, 0x00], // 'f'
    [0x00, 0x00, 0x6E, 0x33, 0x33, 0x3E, 0x30, 0x1F], // 'g'
    [0x07, 0x06, 0x36, 0x6E, 0x66, 0x66, 0x67, 0x00], // 'h'
    [0x0C, 0x00, 0x0E, 0x0C, 0x0C, 0x0C, 0x1E, 0x00], // 'i'
    [0x30, 0x00, 0x30, 0x30, 0x30, 0x33, 0x33, 0x1E], // 'j'
    [0x07, 0x06, 0x66, 0x36, 0x1E, 0x36, 0x67, 0x00], // 'k'
    [0x0E, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0x1E, 0x00], // 'l'
    [0x00, 0x00, 0x33, 0x7F, 0x7F, 0x6B, 0x63, 0x00], // 'm'
    [0x00, 0x00, 0x1F, 0x33, 0x33, 0x33, 0x33, 0x00], // 'n'
    [0x00, 0x00, 0x1E, 0x33, 0x33, 0x33, 0x1E, 0x00], // 'o'
    [0x00, 0x00, 0x3B, 0x66, 0x66, 0x3E, 0x06, 0x0F], // 'p'
    [0x00, 0x00, 0x6E, 0x33, 0x33, 0x3E, 0x30, 0x78], // 'q'
    [0x00, 0x00, 0x3B, 0x6E, 0x66, 0x06, 0x0F, 0x00], // 'r'
    [0x00, 0x00, 0x3E, 0x03, 0x1E, 0x30, 0x1F, 0x00], // 's'
    [0x08, 0x0C, 0x3E, 0x0C, 0x0C, 0x2C, 0x18, 0x00], // 't'
    [0x00, 0x00, 0x33, 0x33, 0x33, 0x33, 0x6E, 0x00], // 'u'
    [0x00, 0x00, 0x33, 0x33, 0x33, 0x1E, 0x0C, 0x00], // 'v'
    [0x00, 0x00, 0x63, 0x6B, 0x7F, 0x7F, 0x36, 0x00], // 'w'
    [0x00, 0x00, 0x63, 0x36, 0x1C, 0x36, 0x63, 0x00], // 'x'
    [0x00, 0x00, 0x33, 0x33, 0x33, 0x3E, 0x30, 0x1F], // 'y'
    [0x00, 0x00, 0x3F, 0x19, 0x0C, 0x26, 0x3F, 0x00], // 'z'
    [0x38, 0x0C, 0x0C, 0x07, 0x0C, 0x0C, 0x38, 0x00], // '{'
    [0x18, 0x18, 0x18, 0x00, 0x18, 0x18, 0x18, 0x00], // '|'
    [0x07, 0x0C, 0x0C, 0x38, 0x0C, 0x0C, 0x07, 0x00], // '}'
    [0x6E, 0x3B, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // '~'
];
