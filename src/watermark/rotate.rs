//! Rotation with automatic canvas expansion.
//!
//! Positive degrees rotate counter-clockwise. The output canvas grows to the
//! rotated bounding box so no corner is clipped; uncovered pixels stay fully
//! transparent. Sampling is inverse-mapped bilinear interpolation.

use image::{Rgba, RgbaImage};

/// Rotate an RGBA image by `degrees` (counter-clockwise), expanding the
/// canvas to fit the rotated bounding box.
pub fn rotate_expand(image: &RgbaImage, degrees: f32) -> RgbaImage {
    let radians = degrees.to_radians();
    let cos = radians.cos();
    let sin = radians.sin();

    let src_w = image.width() as f32;
    let src_h = image.height() as f32;
    let cx = src_w / 2.0;
    let cy = src_h / 2.0;

    // Rotated bounding box from the four corners around the center
    let corners = [
        (-cx, -cy),
        (src_w - cx, -cy),
        (-cx, src_h - cy),
        (src_w - cx, src_h - cy),
    ];

    let mut min_x = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for (x, y) in corners {
        let rx = x * cos - y * sin;
        let ry = x * sin + y * cos;
        min_x = min_x.min(rx);
        max_x = max_x.max(rx);
        min_y = min_y.min(ry);
        max_y = max_y.max(ry);
    }

    let dst_w = ((max_x - min_x).ceil() as u32).max(1);
    let dst_h = ((max_y - min_y).ceil() as u32).max(1);

    let mut rotated = RgbaImage::new(dst_w, dst_h);

    let dst_cx = dst_w as f32 / 2.0;
    let dst_cy = dst_h as f32 / 2.0;

    // Inverse rotation for destination-to-source sampling
    let inv_cos = (-radians).cos();
    let inv_sin = (-radians).sin();

    for dy in 0..dst_h {
        for dx in 0..dst_w {
            let rx = dx as f32 + 0.5 - dst_cx;
            let ry = dy as f32 + 0.5 - dst_cy;

            let sx = rx * inv_cos - ry * inv_sin + cx - 0.5;
            let sy = rx * inv_sin + ry * inv_cos + cy - 0.5;

            if sx >= 0.0 && sx < src_w - 1.0 && sy >= 0.0 && sy < src_h - 1.0 {
                rotated.put_pixel(dx, dy, sample_bilinear(image, sx, sy));
            }
        }
    }

    rotated
}

fn sample_bilinear(image: &RgbaImage, sx: f32, sy: f32) -> Rgba<u8> {
    let x0 = sx.floor() as u32;
    let y0 = sy.floor() as u32;
    let x1 = x0 + 1;
    let y1 = y0 + 1;

    let fx = sx - x0 as f32;
    let fy = sy - y0 as f32;

    let p00 = image.get_pixel(x0, y0);
    let p10 = image.get_pixel(x1, y0);
    let p01 = image.get_pixel(x0, y1);
    let p11 = image.get_pixel(x1, y1);

    let lerp2 = |c: usize| -> u8 {
        let v = p00[c] as f32 * (1.0 - fx) * (1.0 - fy)
            + p10[c] as f32 * fx * (1.0 - fy)
            + p01[c] as f32 * (1.0 - fx) * fy
            + p11[c] as f32 * fx * fy;
        v.clamp(0.0, 255.0) as u8
    };

    Rgba([lerp2(0), lerp2(1), lerp2(2), lerp2(3)])
}
