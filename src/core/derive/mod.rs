//! # Derive Module
//!
//! Resized and cropped derivatives of images, cached on disk and addressed
//! by content hash plus rendering profile name.
//!
//! ## Cache layout
//! `<cache_root>/<h0>/<h1>/<h2>/<hash>_<width>x<height>_<options>.<ext>`
//!
//! JPEG output adds a `q<N>` token for the encoder quality. The path is a
//! pure function of `(hash, profile, quality)`, so a derivative that exists
//! is reused without decoding the source again.
//!
//! ## Pixel backends
//! Decoding and resizing go through the [`ImageCodec`] trait. The default
//! [`RasterCodec`] uses zune-jpeg for JPEG, the image crate for the other
//! formats and fast_image_resize for resampling.

mod codec;
mod config;
mod engine;
mod fast_decode;
mod fast_resize;
mod locks;
mod profile;

pub use codec::{apply_orientation, ImageCodec, RasterCodec};
pub use config::{DeriveConfig, DEFAULT_JPEG_QUALITY};
pub use engine::{DerivativeEngine, ProfileFailure, ResampleReport};
pub use fast_resize::{plan, Geometry};
pub use profile::{Anchor, FitMode, OutputFormat, ProfileTable, RenderProfile, ResampleOption};
