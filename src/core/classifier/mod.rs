//! # Classifier Module
//!
//! Maps a path to a [`TypeCategory`] and a MIME string.
//!
//! ## Rules
//! - Known extensions decide the category (case-insensitive)
//! - Textual/metadata extensions are always [`TypeCategory::Sidecar`]
//! - Missing or unknown extensions fall back to sniffing the first bytes
//! - RAW and HEIF report `application/octet-stream` as MIME

mod sniff;

pub use sniff::{sniff_category, sniff_mime, SNIFF_LEN};

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Generic binary MIME type
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Media type category of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeCategory {
    /// JPEG photos
    Photo,
    /// Camera RAW formats (DNG, CR2, NEF, ...)
    RawPhoto,
    /// HEIF/HEIC photos
    HeifPhoto,
    /// Other raster images (PNG, TIFF, BMP, GIF, WebP)
    OtherImage,
    Video,
    /// Metadata and edit-history files that are never viewable on their own
    Sidecar,
    Unknown,
}

impl TypeCategory {
    /// Detect category from a file extension (without the dot)
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" | "jpe" | "jfif" => TypeCategory::Photo,
            "dng" | "cr2" | "cr3" | "crw" | "nef" | "nrw" | "arw" | "srf" | "sr2" | "orf"
            | "rw2" | "raf" | "pef" | "srw" | "x3f" | "3fr" | "erf" | "kdc" | "mrw" | "mef"
            | "iiq" | "raw" | "rwl" => TypeCategory::RawPhoto,
            "heic" | "heif" | "heics" | "heifs" | "avci" => TypeCategory::HeifPhoto,
            "png" | "tif" | "tiff" | "bmp" | "gif" | "webp" => TypeCategory::OtherImage,
            "mp4" | "m4v" | "mov" | "qt" | "avi" | "mkv" | "webm" | "mpg" | "mpeg" | "3gp"
            | "mts" | "m2ts" | "wmv" | "flv" => TypeCategory::Video,
            "xmp" | "aae" | "xml" | "json" | "txt" | "yml" | "yaml" | "md" | "csv" | "toml"
            | "thm" | "log" => TypeCategory::Sidecar,
            _ => TypeCategory::Unknown,
        }
    }

    /// Categories that carry pixels
    pub fn is_image(&self) -> bool {
        matches!(
            self,
            TypeCategory::Photo
                | TypeCategory::RawPhoto
                | TypeCategory::HeifPhoto
                | TypeCategory::OtherImage
        )
    }

    /// Camera photo categories (JPEG, RAW, HEIF)
    pub fn is_photo(&self) -> bool {
        matches!(
            self,
            TypeCategory::Photo | TypeCategory::RawPhoto | TypeCategory::HeifPhoto
        )
    }

    /// Whether the MIME type is reported as generic binary
    fn has_opaque_mime(&self) -> bool {
        matches!(self, TypeCategory::RawPhoto | TypeCategory::HeifPhoto)
    }
}

impl std::fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TypeCategory::Photo => "photo",
            TypeCategory::RawPhoto => "raw",
            TypeCategory::HeifPhoto => "heif",
            TypeCategory::OtherImage => "image",
            TypeCategory::Video => "video",
            TypeCategory::Sidecar => "sidecar",
            TypeCategory::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Result of classifying one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: TypeCategory,
    pub mime: String,
}

/// Classify a file by extension, sniffing its header when needed.
///
/// Never fails: unreadable files classify as whatever the extension says,
/// or [`TypeCategory::Unknown`] with a generic MIME type.
pub fn classify(path: &Path) -> Classification {
    let header = read_header(path);
    classify_with_header(path, &header)
}

/// Classify using an already-read header prefix
pub fn classify_with_header(path: &Path, header: &[u8]) -> Classification {
    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(TypeCategory::from_extension)
        .unwrap_or(TypeCategory::Unknown);

    let category = if by_extension == TypeCategory::Unknown {
        let sniffed = sniff_category(header);
        debug!(path = %path.display(), category = %sniffed, "classified by content");
        sniffed
    } else {
        by_extension
    };

    let mime = if category.has_opaque_mime() {
        OCTET_STREAM.to_string()
    } else {
        sniff_mime(header).to_string()
    };

    Classification { category, mime }
}

fn read_header(path: &Path) -> Vec<u8> {
    let mut header = Vec::with_capacity(SNIFF_LEN);
    if let Ok(file) = File::open(path) {
        // Short reads are fine, the sniffer only looks at what is there
        let _ = file.take(SNIFF_LEN as u64).read_to_end(&mut header);
    }
    header
}
