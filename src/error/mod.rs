//! # Error Module
//!
//! Typed errors for media identification and derivative generation.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - operation, path and profile name
//! - **Inspectable** - every error maps to one [`ErrorKind`]

use std::path::PathBuf;
use thiserror::Error;

/// The recognizable failure kinds callers can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The path did not exist when the handle was constructed
    NotFound,
    /// A photo-only operation was asked of a non-image file
    NotAPhoto,
    /// Metadata could not be read from the payload
    ExtractionFailure,
    /// The payload could not be decoded as an image
    UnsupportedFormat,
    /// The rendering profile name is not in the profile table, or the
    /// table itself is malformed
    InvalidProfile,
    /// Listing, reading, moving, copying or writing failed
    Filesystem,
}

/// Top-level library error
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("{0}")]
    Extraction(#[from] ExtractionError),

    #[error("{0}")]
    Thumbnail(#[from] ThumbnailError),

    #[error("failed to {op} {path}: {source}")]
    Filesystem {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid profile table: {0}")]
    ProfileTable(String),
}

impl MediaError {
    /// Wrap an I/O error with the operation and path it happened on
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MediaError::Filesystem {
            op,
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MediaError::NotFound { .. } => ErrorKind::NotFound,
            MediaError::Extraction(e) => e.kind(),
            MediaError::Thumbnail(e) => e.kind(),
            MediaError::Filesystem { .. } => ErrorKind::Filesystem,
            MediaError::ProfileTable(_) => ErrorKind::InvalidProfile,
        }
    }
}

/// Errors from metadata extraction and dimension decoding.
///
/// Cloneable so a failed extraction can be memoized on the handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("not a photo: {path}")]
    NotAPhoto { path: PathBuf },

    #[error("could not read metadata from {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("no metadata support for {path}: {reason}")]
    Unsupported { path: PathBuf, reason: String },

    #[error("could not decode dimensions of {path}: {reason}")]
    Dimensions { path: PathBuf, reason: String },

    #[error("failed to read {path}: {reason}")]
    Read { path: PathBuf, reason: String },
}

impl ExtractionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractionError::NotAPhoto { .. } => ErrorKind::NotAPhoto,
            ExtractionError::Read { .. } => ErrorKind::Filesystem,
            ExtractionError::Dimensions { .. } => ErrorKind::UnsupportedFormat,
            ExtractionError::Corrupt { .. } | ExtractionError::Unsupported { .. } => {
                ErrorKind::ExtractionFailure
            }
        }
    }
}

/// Errors from the derivative cache engine
#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("invalid profile {name}")]
    InvalidProfile { name: String },

    #[error("not a photo: {path}")]
    NotAPhoto { path: PathBuf },

    #[error("could not create thumbnail of {path} ({reason})")]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error("profile {profile} has degenerate geometry {width}x{height}")]
    DegenerateGeometry {
        profile: String,
        width: u32,
        height: u32,
    },

    #[error("failed to read source {path}: {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write derivative {path}: {source}")]
    WriteCache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode derivative for profile {profile}: {reason}")]
    Encode { profile: String, reason: String },
}

impl ThumbnailError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ThumbnailError::InvalidProfile { .. } => ErrorKind::InvalidProfile,
            ThumbnailError::NotAPhoto { .. } => ErrorKind::NotAPhoto,
            ThumbnailError::UnsupportedFormat { .. }
            | ThumbnailError::DegenerateGeometry { .. }
            | ThumbnailError::Encode { .. } => ErrorKind::UnsupportedFormat,
            ThumbnailError::ReadSource { .. } | ThumbnailError::WriteCache { .. } => {
                ErrorKind::Filesystem
            }
        }
    }
}

/// Errors from a pixel codec backend, before path/profile context is added
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("image: unknown format")]
    UnknownFormat,

    #[error("image: {0}")]
    Decode(String),

    #[error("degenerate geometry {width}x{height}")]
    Degenerate { width: u32, height: u32 },

    #[error("resize failed: {0}")]
    Resize(String),

    #[error("encode failed: {0}")]
    Encode(String),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, MediaError>;
