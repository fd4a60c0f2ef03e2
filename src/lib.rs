//! # Media Identity
//!
//! Identification of media files and generation of cached derivatives.
//!
//! Given a path, the library classifies the file, reads its metadata,
//! computes a canonical identity from capture time and content, finds the
//! sidecars and variants that belong to the same asset, and renders
//! thumbnails into a content-addressed cache.
//!
//! ## Architecture
//! - `core` - The identification and derivative engine
//! - `events` - Channel-based progress reporting
//! - `error` - Typed, inspectable errors
//!
//! The `media-id` binary wraps the library in a command-line interface.

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use crate::core::{DerivativeEngine, DeriveConfig, MediaFile, RelatedFileSet};
pub use error::{ErrorKind, MediaError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
