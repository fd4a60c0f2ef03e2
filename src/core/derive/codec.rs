//! Pixel codec capability and the default raster backend.

use super::fast_decode::FastDecoder;
use super::fast_resize::{plan, resize_rgb};
use super::profile::{OutputFormat, RenderProfile};
use crate::core::classifier::TypeCategory;
use crate::error::CodecError;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};

/// Capability: decode dimensions, decode pixels, and render a profile.
///
/// Implementations must be deterministic: identical inputs produce
/// byte-identical output.
pub trait ImageCodec: Send + Sync {
    /// Width and height without a full pixel decode
    fn dimensions(&self, bytes: &[u8], category: TypeCategory) -> Result<(u32, u32), CodecError>;

    fn decode(&self, bytes: &[u8], category: TypeCategory) -> Result<DynamicImage, CodecError>;

    /// Resize/crop `image` for `profile` and encode the result
    fn render(
        &self,
        image: &DynamicImage,
        profile: &RenderProfile,
        quality: u8,
    ) -> Result<Vec<u8>, CodecError>;
}

/// Default backend: zune-jpeg/image for decoding, fast_image_resize for
/// resampling, image for encoding.
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterCodec;

impl RasterCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ImageCodec for RasterCodec {
    fn dimensions(&self, bytes: &[u8], category: TypeCategory) -> Result<(u32, u32), CodecError> {
        FastDecoder::dimensions(bytes, category == TypeCategory::Photo)
    }

    fn decode(&self, bytes: &[u8], category: TypeCategory) -> Result<DynamicImage, CodecError> {
        FastDecoder::decode(bytes, category == TypeCategory::Photo)
    }

    fn render(
        &self,
        image: &DynamicImage,
        profile: &RenderProfile,
        quality: u8,
    ) -> Result<Vec<u8>, CodecError> {
        let geometry = plan(image.width(), image.height(), profile)?;
        let resized = resize_rgb(image, &geometry, profile.nearest_neighbor())?;
        let (width, height) = resized.dimensions();

        let mut out = Vec::new();
        let result = match profile.format() {
            OutputFormat::Jpeg => JpegEncoder::new_with_quality(&mut out, quality).write_image(
                resized.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            ),
            OutputFormat::Png => PngEncoder::new(&mut out).write_image(
                resized.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            ),
        };
        result.map_err(|e| CodecError::Encode(e.to_string()))?;

        Ok(out)
    }
}

/// Rotate/flip an image so that EXIF orientation 1 describes it
pub fn apply_orientation(image: DynamicImage, orientation: u16) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}
