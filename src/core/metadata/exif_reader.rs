//! EXIF-backed metadata extraction using kamadak-exif.

use super::{Metadata, MetadataExtractor};
use crate::core::classifier::TypeCategory;
use crate::error::ExtractionError;
use chrono::{DateTime, NaiveDateTime, Utc};
use exif::{Exif, In, Reader, Tag, Value};
use std::io::Cursor;
use std::path::Path;

const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Default extractor reading EXIF from image containers.
///
/// Video containers are not supported and fail with
/// [`ExtractionError::Unsupported`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifExtractor;

impl ExifExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataExtractor for ExifExtractor {
    fn extract(
        &self,
        bytes: &[u8],
        category: TypeCategory,
        path: &Path,
    ) -> Result<Metadata, ExtractionError> {
        match category {
            TypeCategory::Sidecar | TypeCategory::Unknown => {
                return Err(ExtractionError::NotAPhoto {
                    path: path.to_path_buf(),
                })
            }
            TypeCategory::Video => {
                return Err(ExtractionError::Unsupported {
                    path: path.to_path_buf(),
                    reason: "video containers carry no EXIF".to_string(),
                })
            }
            _ => {}
        }

        let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
            Ok(exif) => exif,
            // A valid container without an EXIF block simply has no fields
            Err(exif::Error::NotFound(_)) => return Ok(Metadata::default()),
            Err(e) => {
                return Err(ExtractionError::Corrupt {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        };

        Ok(read_fields(&exif))
    }
}

fn read_fields(exif: &Exif) -> Metadata {
    let string = |tag| {
        exif.get_field(tag, In::PRIMARY)
            .and_then(|f| get_string_value(&f.value))
            .unwrap_or_default()
    };
    let rational = |tag| {
        exif.get_field(tag, In::PRIMARY)
            .and_then(|f| get_f64_value(&f.value))
            .unwrap_or_default()
    };
    let number = |tag| {
        exif.get_field(tag, In::PRIMARY)
            .and_then(|f| get_u32_value(&f.value))
    };

    let mut metadata = Metadata {
        taken_at: read_taken_at(exif),
        camera_make: string(Tag::Make),
        camera_model: string(Tag::Model),
        lens_make: string(Tag::LensMake),
        lens_model: string(Tag::LensModel),
        exposure: exif
            .get_field(Tag::ExposureTime, In::PRIMARY)
            .and_then(|f| format_exposure(&f.value))
            .unwrap_or_default(),
        f_number: rational(Tag::FNumber),
        iso: number(Tag::PhotographicSensitivity).unwrap_or_default(),
        focal_length: rational(Tag::FocalLength),
        orientation: number(Tag::Orientation).unwrap_or_default() as u16,
        // Prefer actual pixel dimensions, fall back to image width/height tags
        width: number(Tag::PixelXDimension)
            .or_else(|| number(Tag::ImageWidth))
            .unwrap_or_default(),
        height: number(Tag::PixelYDimension)
            .or_else(|| number(Tag::ImageLength))
            .unwrap_or_default(),
        ..Default::default()
    };

    if let (Some(lat), Some(lng)) = (
        read_coordinate(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, "S"),
        read_coordinate(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, "W"),
    ) {
        metadata.latitude = lat;
        metadata.longitude = lng;
        metadata.has_location = true;
    }

    metadata
}

/// Capture time from DateTimeOriginal (or DateTimeDigitized), shifted to UTC
/// when an offset tag is present.
fn read_taken_at(exif: &Exif) -> Option<DateTime<Utc>> {
    let (date_tag, offset_tag) = if exif.get_field(Tag::DateTimeOriginal, In::PRIMARY).is_some() {
        (Tag::DateTimeOriginal, Tag::OffsetTimeOriginal)
    } else {
        (Tag::DateTimeDigitized, Tag::OffsetTimeDigitized)
    };

    let raw = exif
        .get_field(date_tag, In::PRIMARY)
        .and_then(|f| get_string_value(&f.value))?;
    let offset = exif
        .get_field(offset_tag, In::PRIMARY)
        .and_then(|f| get_string_value(&f.value));

    parse_exif_date(&raw, offset.as_deref())
}

/// Parse an EXIF "YYYY:MM:DD HH:MM:SS" timestamp.
///
/// Without an offset the wall-clock time is taken as UTC.
pub(crate) fn parse_exif_date(raw: &str, offset: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Some(offset) = offset {
        let combined = format!("{} {}", raw, offset.trim());
        if let Ok(dt) = DateTime::parse_from_str(&combined, "%Y:%m:%d %H:%M:%S %:z") {
            return Some(dt.with_timezone(&Utc));
        }
    }

    NaiveDateTime::parse_from_str(raw, EXIF_DATE_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

/// Degrees/minutes/seconds rationals to signed decimal degrees
fn read_coordinate(exif: &Exif, tag: Tag, ref_tag: Tag, negative_ref: &str) -> Option<f64> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let Value::Rational(ref parts) = field.value else {
        return None;
    };
    if parts.len() < 3 || parts.iter().any(|r| r.denom == 0) {
        return None;
    }

    let degrees = parts[0].to_f64() + parts[1].to_f64() / 60.0 + parts[2].to_f64() / 3600.0;
    let negative = exif
        .get_field(ref_tag, In::PRIMARY)
        .and_then(|f| get_string_value(&f.value))
        .is_some_and(|r| r.eq_ignore_ascii_case(negative_ref));

    Some(if negative { -degrees } else { degrees })
}

/// Render an exposure time the way cameras show it ("1/640", "2")
fn format_exposure(value: &Value) -> Option<String> {
    let Value::Rational(ref vec) = value else {
        return None;
    };
    let r = vec.first()?;
    if r.num == 0 || r.denom == 0 {
        return None;
    }

    if r.num < r.denom {
        let denominator = (r.denom as f64 / r.num as f64).round() as u32;
        Some(format!("1/{}", denominator))
    } else {
        let seconds = r.to_f64();
        if seconds.fract() == 0.0 {
            Some(format!("{}", seconds as u32))
        } else {
            Some(format!("{:.1}", seconds))
        }
    }
}

/// Helper to extract u32 from various EXIF value types
fn get_u32_value(value: &Value) -> Option<u32> {
    match value {
        Value::Long(vec) => vec.first().copied(),
        Value::Short(vec) => vec.first().map(|v| *v as u32),
        _ => None,
    }
}

fn get_f64_value(value: &Value) -> Option<f64> {
    match value {
        Value::Rational(vec) => vec.first().filter(|r| r.denom != 0).map(|r| r.to_f64()),
        Value::SRational(vec) => vec.first().filter(|r| r.denom != 0).map(|r| r.to_f64()),
        _ => None,
    }
}

/// Helper to extract string from EXIF ASCII value
fn get_string_value(value: &Value) -> Option<String> {
    if let Value::Ascii(ref vec) = value {
        if let Some(bytes) = vec.first() {
            if let Ok(s) = std::str::from_utf8(bytes) {
                let trimmed = s.trim_end_matches('\0').trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}
