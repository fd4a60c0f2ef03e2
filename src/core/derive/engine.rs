//! Derivative generation and cache lookup.

use super::codec::{apply_orientation, ImageCodec, RasterCodec};
use super::config::DeriveConfig;
use super::locks::KeyLocks;
use super::profile::RenderProfile;
use crate::core::media_file::MediaFile;
use crate::error::{CodecError, MediaError, ThumbnailError};
use crate::events::{DeriveEvent, EventSender};
use image::DynamicImage;
use rayon::prelude::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Outcome of generating the default profile set for one source
#[derive(Debug, Default)]
pub struct ResampleReport {
    /// Profiles written by this call
    pub generated: Vec<String>,
    /// Profiles whose derivative already existed
    pub skipped: Vec<String>,
    pub failures: Vec<ProfileFailure>,
}

impl ResampleReport {
    /// Every default profile now has a derivative on disk
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// One profile that could not be generated
#[derive(Debug)]
pub struct ProfileFailure {
    pub profile: String,
    pub error: ThumbnailError,
}

/// Produces and caches derivatives addressed by content hash and profile name
pub struct DerivativeEngine {
    config: DeriveConfig,
    codec: Arc<dyn ImageCodec>,
    locks: KeyLocks,
}

impl DerivativeEngine {
    pub fn new(config: DeriveConfig) -> Self {
        Self::with_codec(config, Arc::new(RasterCodec::new()))
    }

    /// Engine using an alternate pixel backend
    pub fn with_codec(config: DeriveConfig, codec: Arc<dyn ImageCodec>) -> Self {
        Self {
            config,
            codec,
            locks: KeyLocks::new(),
        }
    }

    pub fn config(&self) -> &DeriveConfig {
        &self.config
    }

    /// Cache path of `(hash, profile)`; pure, touches nothing on disk
    pub fn derivative_path(&self, hash: &str, profile: &str) -> Result<PathBuf, ThumbnailError> {
        let profile = self.config.profiles.get(profile)?;
        Ok(self.path_for(profile, hash))
    }

    fn path_for(&self, profile: &RenderProfile, hash: &str) -> PathBuf {
        profile.derivative_path(&self.config.cache_root, hash, self.config.jpeg_quality)
    }

    /// Path of a cached derivative, generating it first if it is missing
    pub fn thumbnail(&self, file: &MediaFile, profile: &str) -> Result<PathBuf, ThumbnailError> {
        let profile = self.config.profiles.get(profile)?;
        ensure_image(file)?;
        let path = self.path_for(profile, &source_hash(file)?);

        if path.is_file() {
            debug!(profile = %profile.name, path = %path.display(), "derivative cache hit");
            return Ok(path);
        }

        self.exclusive(&path, || {
            if path.is_file() {
                debug!(profile = %profile.name, "derivative generated concurrently");
                return Ok(());
            }
            let image = self.load(file)?;
            self.render_to(&image, profile, &path)
        })?;

        Ok(path)
    }

    /// Regenerate a derivative unconditionally, overwriting any cached copy
    pub fn resample(&self, file: &MediaFile, profile: &str) -> Result<PathBuf, ThumbnailError> {
        let profile = self.config.profiles.get(profile)?;
        ensure_image(file)?;
        let path = self.path_for(profile, &source_hash(file)?);

        let image = self.load(file)?;
        self.exclusive(&path, || self.render_to(&image, profile, &path))?;

        Ok(path)
    }

    /// Generate every profile of the default set.
    ///
    /// Existing derivatives are kept unless `force` is set. Source failures
    /// abort before any profile is rendered; a failing profile is recorded
    /// in the report and the other profiles still run.
    pub fn resample_default(
        &self,
        file: &MediaFile,
        force: bool,
        events: Option<&EventSender>,
    ) -> Result<ResampleReport, ThumbnailError> {
        ensure_image(file)?;
        let hash = source_hash(file)?;
        let emit = |event: DeriveEvent| {
            if let Some(sender) = events {
                sender.send(event);
            }
        };

        let profiles: Vec<&RenderProfile> = self.config.profiles.defaults().collect();
        emit(DeriveEvent::Started {
            source: file.file_name(),
            total: profiles.len(),
        });

        let mut report = ResampleReport::default();
        let mut pending = Vec::new();
        for profile in profiles {
            let path = self.path_for(profile, &hash);
            if !force && path.is_file() {
                debug!(profile = %profile.name, "derivative exists, skipping");
                emit(DeriveEvent::Skipped {
                    profile: profile.name.clone(),
                    path,
                });
                report.skipped.push(profile.name.clone());
            } else {
                pending.push((profile, path));
            }
        }

        if !pending.is_empty() {
            let image = self.load(file)?;
            let outcomes: Vec<(&RenderProfile, Result<PathBuf, ThumbnailError>)> = pending
                .into_par_iter()
                .map(|(profile, path)| {
                    let result = self
                        .exclusive(&path, || self.render_to(&image, profile, &path))
                        .map(|()| path);
                    match &result {
                        Ok(path) => emit(DeriveEvent::Generated {
                            profile: profile.name.clone(),
                            path: path.clone(),
                        }),
                        Err(e) => emit(DeriveEvent::Failed {
                            profile: profile.name.clone(),
                            message: e.to_string(),
                        }),
                    }
                    (profile, result)
                })
                .collect();

            for (profile, result) in outcomes {
                match result {
                    Ok(_) => report.generated.push(profile.name.clone()),
                    Err(error) => {
                        warn!(profile = %profile.name, source = %file.file_name().display(), %error, "profile failed");
                        report.failures.push(ProfileFailure {
                            profile: profile.name.clone(),
                            error,
                        });
                    }
                }
            }
        }

        emit(DeriveEvent::Completed {
            generated: report.generated.len(),
            skipped: report.skipped.len(),
            failed: report.failures.len(),
        });
        Ok(report)
    }

    fn exclusive<T>(&self, path: &Path, f: impl FnOnce() -> T) -> T {
        if self.config.serialize_generation {
            self.locks.acquire(path).run(f)
        } else {
            f()
        }
    }

    /// Read, decode and orient the source pixels
    fn load(&self, file: &MediaFile) -> Result<DynamicImage, ThumbnailError> {
        let bytes = file.read_bytes().map_err(read_error)?;
        let image = self
            .codec
            .decode(&bytes, file.category())
            .map_err(|e| ThumbnailError::UnsupportedFormat {
                path: file.file_name(),
                reason: e.to_string(),
            })?;
        Ok(apply_orientation(image, file.orientation()))
    }

    fn render_to(
        &self,
        image: &DynamicImage,
        profile: &RenderProfile,
        path: &Path,
    ) -> Result<(), ThumbnailError> {
        if profile.is_degenerate() {
            return Err(degenerate(profile));
        }

        let encoded = self
            .codec
            .render(image, profile, self.config.jpeg_quality)
            .map_err(|e| match e {
                CodecError::Degenerate { .. } => degenerate(profile),
                other => ThumbnailError::Encode {
                    profile: profile.name.clone(),
                    reason: other.to_string(),
                },
            })?;

        write_atomic(path, &encoded)?;
        info!(profile = %profile.name, path = %path.display(), bytes = encoded.len(), "generated derivative");
        Ok(())
    }
}

/// Write through a temp file in the target directory so readers never see
/// a partial derivative
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ThumbnailError> {
    let write_error = |source| ThumbnailError::WriteCache {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    fs::create_dir_all(dir).map_err(write_error)?;
    let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp.write_all(bytes).map_err(write_error)?;
    temp.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}

fn ensure_image(file: &MediaFile) -> Result<(), ThumbnailError> {
    if file.category().is_image() {
        Ok(())
    } else {
        Err(ThumbnailError::NotAPhoto {
            path: file.file_name(),
        })
    }
}

fn source_hash(file: &MediaFile) -> Result<String, ThumbnailError> {
    file.hash().map_err(read_error)
}

fn read_error(error: MediaError) -> ThumbnailError {
    match error {
        MediaError::Filesystem { path, source, .. } => ThumbnailError::ReadSource { path, source },
        MediaError::NotFound { path } => ThumbnailError::ReadSource {
            path,
            source: std::io::ErrorKind::NotFound.into(),
        },
        other => ThumbnailError::ReadSource {
            path: PathBuf::new(),
            source: std::io::Error::other(other.to_string()),
        },
    }
}

fn degenerate(profile: &RenderProfile) -> ThumbnailError {
    ThumbnailError::DegenerateGeometry {
        profile: profile.name.clone(),
        width: profile.width,
        height: profile.height,
    }
}
