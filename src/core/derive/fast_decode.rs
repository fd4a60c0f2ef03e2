//! Fast image decoding with format-specific optimizations.
//!
//! Uses zune-jpeg for JPEG payloads (1.5-2x faster than image crate),
//! falls back to image crate for other formats.

use crate::error::CodecError;
use image::{DynamicImage, ImageBuffer, ImageError, ImageReader, Luma, Rgb, Rgba};
use std::io::Cursor;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Decoder that picks the fastest available path per format
pub struct FastDecoder;

impl FastDecoder {
    /// Decode a full image from memory
    pub fn decode(bytes: &[u8], jpeg: bool) -> Result<DynamicImage, CodecError> {
        if jpeg {
            Self::decode_jpeg(bytes).or_else(|_| Self::decode_fallback(bytes))
        } else {
            Self::decode_fallback(bytes)
        }
    }

    /// Read width and height from the header without decoding pixels
    pub fn dimensions(bytes: &[u8], jpeg: bool) -> Result<(u32, u32), CodecError> {
        if jpeg {
            let mut decoder = JpegDecoder::new(bytes);
            if decoder.decode_headers().is_ok() {
                if let Some((w, h)) = decoder.dimensions() {
                    return Ok((w as u32, h as u32));
                }
            }
        }

        ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CodecError::Decode(e.to_string()))?
            .into_dimensions()
            .map_err(map_image_error)
    }

    fn decode_jpeg(bytes: &[u8]) -> Result<DynamicImage, CodecError> {
        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(bytes, options);

        let pixels = decoder
            .decode()
            .map_err(|e| CodecError::Decode(format!("zune-jpeg decode failed: {:?}", e)))?;

        let info = decoder
            .info()
            .ok_or_else(|| CodecError::Decode("Failed to get image info".to_string()))?;

        let width = info.width as u32;
        let height = info.height as u32;

        let out_colorspace = decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB);

        let image = match out_colorspace {
            ColorSpace::RGB => {
                let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| {
                        CodecError::Decode("Failed to create RGB buffer".to_string())
                    })?;
                DynamicImage::ImageRgb8(buffer)
            }
            ColorSpace::RGBA => {
                let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| {
                        CodecError::Decode("Failed to create RGBA buffer".to_string())
                    })?;
                DynamicImage::ImageRgba8(buffer)
            }
            ColorSpace::Luma => {
                let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| {
                        CodecError::Decode("Failed to create Luma buffer".to_string())
                    })?;
                DynamicImage::ImageLuma8(buffer)
            }
            _ => return Self::decode_fallback(bytes),
        };

        Ok(image)
    }

    fn decode_fallback(bytes: &[u8]) -> Result<DynamicImage, CodecError> {
        image::load_from_memory(bytes).map_err(map_image_error)
    }
}

fn map_image_error(error: ImageError) -> CodecError {
    match error {
        ImageError::Unsupported(_) => CodecError::UnknownFormat,
        other => CodecError::Decode(other.to_string()),
    }
}
