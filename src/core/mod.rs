//! # Core Module
//!
//! The media identification engine, independent of any front end.
//!
//! ## Modules
//! - `classifier` - Maps paths to a type category and MIME type
//! - `content` - Reads file bytes and computes content digests
//! - `metadata` - Extracts EXIF fields from photos
//! - `naming` - File name conventions and canonical identities
//! - `media_file` - The per-file handle tying everything together
//! - `related` - Groups sidecars, edits and copies of one asset
//! - `derive` - Cached thumbnail derivatives

pub mod classifier;
pub mod content;
pub mod derive;
pub mod media_file;
pub mod metadata;
pub mod naming;
pub mod related;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types
pub use classifier::{classify, Classification, TypeCategory};
pub use derive::{DerivativeEngine, DeriveConfig, ImageCodec, ProfileTable, RenderProfile, ResampleReport};
pub use media_file::{Capabilities, MediaFile};
pub use metadata::{ExifExtractor, Metadata, MetadataExtractor};
pub use related::{related_files, RelatedFileSet};
