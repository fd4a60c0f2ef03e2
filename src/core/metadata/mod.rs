//! # Metadata Module
//!
//! Extracts camera, exposure, time and location fields from media files.
//!
//! ## Extracted Fields
//! - Capture date/time (DateTimeOriginal, with OffsetTimeOriginal applied)
//! - Image dimensions (width x height)
//! - Camera and lens make/model
//! - Exposure time, f-number, ISO, focal length
//! - Orientation
//! - GPS coordinates
//!
//! Extraction is a pluggable capability ([`MetadataExtractor`]); the default
//! [`ExifExtractor`] reads EXIF from JPEG, TIFF-based RAW, HEIF, PNG and WebP
//! containers.

mod exif_reader;

pub use exif_reader::ExifExtractor;

use crate::core::classifier::TypeCategory;
use crate::error::ExtractionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Flat set of descriptive fields.
///
/// Fields missing from the source keep their zero value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Embedded capture time, normalized to UTC
    pub taken_at: Option<DateTime<Utc>>,
    pub camera_make: String,
    pub camera_model: String,
    pub lens_make: String,
    pub lens_model: String,
    /// Exposure time as shown on cameras, e.g. "1/640"
    pub exposure: String,
    pub f_number: f64,
    pub iso: u32,
    /// Focal length in millimeters
    pub focal_length: f64,
    /// EXIF orientation (1-8), 0 when unknown
    pub orientation: u16,
    pub width: u32,
    pub height: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub has_location: bool,
}

impl Metadata {
    /// True only when both a capture time and GPS coordinates are present
    pub fn has_time_and_place(&self) -> bool {
        self.taken_at.is_some() && self.has_location
    }

    /// Get a display string for the camera
    pub fn camera_display(&self) -> Option<String> {
        match (self.camera_make.is_empty(), self.camera_model.is_empty()) {
            (false, false) => {
                // Avoid duplication like "Apple Apple iPhone"
                if self.camera_model.starts_with(&self.camera_make) {
                    Some(self.camera_model.clone())
                } else {
                    Some(format!("{} {}", self.camera_make, self.camera_model))
                }
            }
            (true, false) => Some(self.camera_model.clone()),
            (false, true) => Some(self.camera_make.clone()),
            (true, true) => None,
        }
    }
}

/// Capability: extract metadata from bytes of a declared type
pub trait MetadataExtractor: Send + Sync {
    /// Extract fields from `bytes`. `path` is only used for error context.
    fn extract(
        &self,
        bytes: &[u8],
        category: TypeCategory,
        path: &Path,
    ) -> Result<Metadata, ExtractionError>;
}
