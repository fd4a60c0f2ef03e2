//! Configuration of the derivative engine.

use super::profile::ProfileTable;
use std::path::{Path, PathBuf};

/// JPEG quality used for derivatives unless configured otherwise
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Everything the derivative engine needs to know up front
#[derive(Debug, Clone)]
pub struct DeriveConfig {
    /// Root directory of the derivative cache
    pub cache_root: PathBuf,
    /// Named rendering profiles
    pub profiles: ProfileTable,
    /// JPEG encoder quality (1-100)
    pub jpeg_quality: u8,
    /// At most one concurrent generation per derivative path
    pub serialize_generation: bool,
}

impl DeriveConfig {
    /// Standard profiles under `cache_root`
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            profiles: ProfileTable::standard(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            serialize_generation: true,
        }
    }

    /// Per-user cache directory, falling back to the system temp dir
    pub fn default_cache_root() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("media-identity")
            .join("thumbnails")
    }

    /// Replace the profile table
    pub fn profiles(mut self, profiles: ProfileTable) -> Self {
        self.profiles = profiles;
        self
    }

    /// Set JPEG quality, clamped to 1-100
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn serialize_generation(mut self, enabled: bool) -> Self {
        self.serialize_generation = enabled;
        self
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }
}

impl Default for DeriveConfig {
    fn default() -> Self {
        Self::new(Self::default_cache_root())
    }
}
