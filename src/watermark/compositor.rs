//! Layer buffers and alpha compositing.
//!
//! A [`Layer`] is a transparent RGBA buffer with the same dimensions as the
//! base image, holding only watermark pixels prior to compositing. Blending
//! uses the Porter-Duff "over" operator per channel,
//! `out = src * srcA + dst * (1 - srcA)`.

use image::{Rgba, RgbaImage};

/// A transparent working buffer the size of the base image.
#[derive(Clone)]
pub struct Layer {
    image: RgbaImage,
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("dimensions", &(self.image.width(), self.image.height()))
            .finish()
    }
}

impl Layer {
    /// Create a fully transparent layer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Wrap an existing RGBA buffer as a layer.
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn as_image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Blend a sprite into this layer at `(x, y)`, clipping at the edges.
    /// Negative coordinates draw the sprite partially (or fully) off-canvas.
    pub fn blit(&mut self, sprite: &RgbaImage, x: i32, y: i32) {
        blend_at(&mut self.image, sprite, x, y);
    }

    /// Alpha-blend this layer over a copy of `base`, returning the result.
    pub fn composite_over(&self, base: &RgbaImage) -> RgbaImage {
        let mut out = base.clone();
        blend_at(&mut out, &self.image, 0, 0);
        out
    }
}

/// Blend `src` over `dst` at `(x, y)` with edge clipping.
fn blend_at(dst: &mut RgbaImage, src: &RgbaImage, x: i32, y: i32) {
    let dst_w = dst.width() as i32;
    let dst_h = dst.height() as i32;
    let src_w = src.width() as i32;
    let src_h = src.height() as i32;

    // Visible region in destination coordinates
    let x_start = x.max(0);
    let y_start = y.max(0);
    let x_end = (x + src_w).min(dst_w);
    let y_end = (y + src_h).min(dst_h);

    for dy in y_start..y_end {
        for dx in x_start..x_end {
            let sx = (dx - x) as u32;
            let sy = (dy - y) as u32;

            let fg = *src.get_pixel(sx, sy);
            if fg[3] == 0 {
                continue;
            }
            let bg = *dst.get_pixel(dx as u32, dy as u32);
            dst.put_pixel(dx as u32, dy as u32, blend_pixels(bg, fg));
        }
    }
}

/// Porter-Duff "over": composite `fg` over `bg` with straight alpha.
pub fn blend_pixels(bg: Rgba<u8>, fg: Rgba<u8>) -> Rgba<u8> {
    let fg_a = fg[3] as f32 / 255.0;
    let bg_a = bg[3] as f32 / 255.0;

    let out_a = fg_a + bg_a * (1.0 - fg_a);
    if out_a < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |f: u8, b: u8| -> u8 {
        let f = f as f32 / 255.0;
        let b = b as f32 / 255.0;
        let v = (f * fg_a + b * bg_a * (1.0 - fg_a)) / out_a;
        (v * 255.0).clamp(0.0, 255.0).round() as u8
    };

    Rgba([
        channel(fg[0], bg[0]),
        channel(fg[1], bg[1]),
        channel(fg[2], bg[2]),
        (out_a * 255.0).round() as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, px: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(w, h, px)
    }

    #[test]
    fn test_blend_opaque_replaces() {
        let bg = Rgba([0, 0, 0, 255]);
        let fg = Rgba([255, 0, 0, 255]);
        assert_eq!(blend_pixels(bg, fg), fg);
    }

    #[test]
    fn test_blend_transparent_foreground_is_noop() {
        let bg = Rgba([10, 20, 30, 255]);
        let fg = Rgba([255, 255, 255, 0]);
        assert_eq!(blend_pixels(bg, fg), bg);
    }

    #[test]
    fn test_blend_half_alpha_white_over_black() {
        let out = blend_pixels(Rgba([0, 0, 0, 255]), Rgba([255, 255, 255, 128]));
        assert!(out[0] > 100 && out[0] < 160);
        assert_eq!(out[3], 255);
    }

    #[test]
    fn test_blend_onto_transparent_keeps_source() {
        let out = blend_pixels(Rgba([0, 0, 0, 0]), Rgba([100, 110, 120, 200]));
        assert_eq!(out, Rgba([100, 110, 120, 200]));
    }

    #[test]
    fn test_new_layer_is_transparent() {
        let layer = Layer::new(8, 8);
        assert!(layer.as_image().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_blit_positions_sprite() {
        let mut layer = Layer::new(50, 50);
        let sprite = solid(10, 10, Rgba([255, 0, 0, 255]));
        layer.blit(&sprite, 20, 30);

        assert_eq!(*layer.as_image().get_pixel(25, 35), Rgba([255, 0, 0, 255]));
        assert_eq!(layer.as_image().get_pixel(10, 10)[3], 0);
    }

    #[test]
    fn test_blit_clips_negative_position() {
        let mut layer = Layer::new(50, 50);
        let sprite = solid(30, 30, Rgba([255, 0, 0, 255]));
        // Only the bottom-right 10x10 of the sprite lands on canvas
        layer.blit(&sprite, -20, -20);

        assert_eq!(layer.as_image().get_pixel(5, 5)[0], 255);
        assert_eq!(layer.as_image().get_pixel(20, 20)[3], 0);
    }

    #[test]
    fn test_blit_clips_past_right_edge() {
        let mut layer = Layer::new(50, 50);
        let sprite = solid(30, 30, Rgba([0, 255, 0, 255]));
        layer.blit(&sprite, 40, 40);

        assert_eq!(layer.as_image().get_pixel(45, 45)[1], 255);
        assert_eq!(layer.as_image().get_pixel(30, 30)[3], 0);
    }

    #[test]
    fn test_blit_fully_off_canvas_is_noop() {
        let mut layer = Layer::new(20, 20);
        let sprite = solid(5, 5, Rgba([255, 0, 0, 255]));
        layer.blit(&sprite, 100, 100);
        layer.blit(&sprite, -50, -50);
        assert!(layer.as_image().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_composite_over_leaves_base_outside_layer_content() {
        let base = solid(40, 40, Rgba([255, 255, 255, 255]));
        let mut layer = Layer::new(40, 40);
        layer.blit(&solid(10, 10, Rgba([0, 0, 255, 255])), 0, 0);

        let out = layer.composite_over(&base);
        assert_eq!(*out.get_pixel(5, 5), Rgba([0, 0, 255, 255]));
        assert_eq!(*out.get_pixel(30, 30), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_composite_transparent_layer_is_identity() {
        let base = solid(16, 16, Rgba([1, 2, 3, 255]));
        let layer = Layer::new(16, 16);
        assert_eq!(layer.composite_over(&base), base);
    }
}
