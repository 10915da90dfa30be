//! High-quality resampling shared by the watermark scaler and the export
//! resize step. Lanczos3 convolution over RGBA buffers.

use std::num::NonZeroU32;

use fast_image_resize::{FilterType, Image, PixelType, ResizeAlg, Resizer};
use image::RgbaImage;

/// Resize an RGBA image to exactly `target_w` x `target_h` with Lanczos3.
///
/// Returns an error string when a dimension is zero or the pixel buffers
/// cannot be constructed.
pub fn resize_rgba(img: &RgbaImage, target_w: u32, target_h: u32) -> Result<RgbaImage, String> {
    let src_w = NonZeroU32::new(img.width()).ok_or("source width is 0")?;
    let src_h = NonZeroU32::new(img.height()).ok_or("source height is 0")?;
    let dst_w = NonZeroU32::new(target_w).ok_or("target width is 0")?;
    let dst_h = NonZeroU32::new(target_h).ok_or("target height is 0")?;

    let src = Image::from_vec_u8(src_w, src_h, img.clone().into_raw(), PixelType::U8x4)
        .map_err(|e| format!("failed to create source image: {:?}", e))?;

    let mut dst = Image::new(dst_w, dst_h, PixelType::U8x4);

    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));
    resizer
        .resize(&src.view(), &mut dst.view_mut())
        .map_err(|e| format!("resize operation failed: {:?}", e))?;

    RgbaImage::from_raw(target_w, target_h, dst.into_vec())
        .ok_or_else(|| "failed to rebuild output image buffer".to_string())
}
