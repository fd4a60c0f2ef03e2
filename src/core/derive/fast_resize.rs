//! Fast SIMD-accelerated resizing for derivatives.
//!
//! Uses fast_image_resize, which is 5-14x faster than image crate's resize
//! and picks AVX2/NEON code paths when available.

use super::profile::{Anchor, FitMode, RenderProfile};
use crate::error::CodecError;
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, RgbImage};

/// Source crop rectangle and output size for one render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// (left, top, width, height) in source pixels
    pub crop: Option<(u32, u32, u32, u32)>,
    pub width: u32,
    pub height: u32,
}

/// Compute the render geometry of `profile` for a source of the given size
pub fn plan(src_width: u32, src_height: u32, profile: &RenderProfile) -> Result<Geometry, CodecError> {
    let (target_w, target_h) = (profile.width, profile.height);
    if target_w == 0 || target_h == 0 || src_width == 0 || src_height == 0 {
        return Err(CodecError::Degenerate {
            width: target_w,
            height: target_h,
        });
    }

    let geometry = match profile.mode() {
        FitMode::Stretch => Geometry {
            crop: None,
            width: target_w,
            height: target_h,
        },
        FitMode::Fit => {
            // Never upscale
            let scale = (target_w as f64 / src_width as f64)
                .min(target_h as f64 / src_height as f64)
                .min(1.0);
            Geometry {
                crop: None,
                width: ((src_width as f64 * scale).round() as u32).max(1),
                height: ((src_height as f64 * scale).round() as u32).max(1),
            }
        }
        FitMode::Fill(anchor) => {
            let target_ratio = target_w as f64 / target_h as f64;
            let src_ratio = src_width as f64 / src_height as f64;

            let (crop_w, crop_h) = if src_ratio > target_ratio {
                let w = ((src_height as f64 * target_ratio).round() as u32).clamp(1, src_width);
                (w, src_height)
            } else {
                let h = ((src_width as f64 / target_ratio).round() as u32).clamp(1, src_height);
                (src_width, h)
            };

            let (left, top) = match anchor {
                Anchor::TopLeft => (0, 0),
                Anchor::Center => ((src_width - crop_w) / 2, (src_height - crop_h) / 2),
                Anchor::BottomRight => (src_width - crop_w, src_height - crop_h),
            };

            Geometry {
                crop: Some((left, top, crop_w, crop_h)),
                width: target_w,
                height: target_h,
            }
        }
    };

    Ok(geometry)
}

/// Resize an RGB image according to `geometry`
pub fn resize_rgb(
    image: &DynamicImage,
    geometry: &Geometry,
    nearest: bool,
) -> Result<RgbImage, CodecError> {
    let rgb = image.to_rgb8();
    let (src_width, src_height) = rgb.dimensions();

    let src_image = Image::from_vec_u8(src_width, src_height, rgb.into_raw(), PixelType::U8x3)
        .map_err(|e| CodecError::Resize(format!("Failed to create source image: {}", e)))?;

    let mut dst_image = Image::new(geometry.width, geometry.height, PixelType::U8x3);

    let algorithm = if nearest {
        ResizeAlg::Nearest
    } else {
        ResizeAlg::Convolution(FilterType::Lanczos3)
    };
    let mut options = ResizeOptions::new().resize_alg(algorithm);
    if let Some((left, top, width, height)) = geometry.crop {
        options = options.crop(left as f64, top as f64, width as f64, height as f64);
    }

    let mut resizer = Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| CodecError::Resize(e.to_string()))?;

    RgbImage::from_raw(geometry.width, geometry.height, dst_image.into_vec())
        .ok_or_else(|| CodecError::Resize("Failed to create result buffer".to_string()))
}
