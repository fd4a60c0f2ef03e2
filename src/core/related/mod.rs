//! # Related Module
//!
//! Finds every file in a directory that belongs to the same logical asset
//! as a given file: sidecars, edits, OS copies and RAW/JPEG pairs.
//!
//! ## Ordering
//! 1. Sidecars before everything else
//! 2. Originals, then edits, then copies
//! 3. Lowercase extension, then file name
//!
//! The order is total, so repeated calls on an unchanged directory agree.

use crate::core::classifier::TypeCategory;
use crate::core::media_file::MediaFile;
use crate::core::naming::{self, NameVariant};
use crate::error::{MediaError, Result};
use std::path::PathBuf;
use tracing::debug;
use walkdir::WalkDir;

/// Ordered group of files sharing one normalized base name
#[derive(Debug, Clone)]
pub struct RelatedFileSet {
    key: String,
    files: Vec<MediaFile>,
}

impl RelatedFileSet {
    /// Group key every member shares (`IMG_4120` for `IMG_E4120 copy.JPG`)
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Never true for a resolved set, which always holds its requester
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MediaFile> {
        self.files.iter()
    }

    pub fn files(&self) -> &[MediaFile] {
        &self.files
    }

    pub fn contains(&self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        self.files.iter().any(|f| f.file_name() == path)
    }

    /// Primary viewable member: JPEG, then HEIF, RAW, other images, video
    pub fn main_file(&self) -> Option<&MediaFile> {
        self.files
            .iter()
            .filter_map(|f| main_rank(f.category()).map(|rank| (rank, f)))
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, f)| f)
    }

    pub fn sidecars(&self) -> impl Iterator<Item = &MediaFile> {
        self.files.iter().filter(|f| f.is_sidecar())
    }
}

impl IntoIterator for RelatedFileSet {
    type Item = MediaFile;
    type IntoIter = std::vec::IntoIter<MediaFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl<'a> IntoIterator for &'a RelatedFileSet {
    type Item = &'a MediaFile;
    type IntoIter = std::slice::Iter<'a, MediaFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

fn main_rank(category: TypeCategory) -> Option<u8> {
    match category {
        TypeCategory::Photo => Some(0),
        TypeCategory::HeifPhoto => Some(1),
        TypeCategory::RawPhoto => Some(2),
        TypeCategory::OtherImage => Some(3),
        TypeCategory::Video => Some(4),
        TypeCategory::Sidecar | TypeCategory::Unknown => None,
    }
}

/// Sort key of a member within its set
fn order_key(file: &MediaFile) -> (bool, NameVariant, String, String) {
    (
        !file.is_sidecar(),
        naming::variant(file.leaf_name()),
        file.extension().to_lowercase(),
        file.leaf_name().to_string(),
    )
}

/// Resolve the related-file set of `file`.
///
/// Fails only if the directory cannot be listed. Siblings that vanish
/// while being listed are left out; the requester is always a member.
pub fn related_files(file: &MediaFile) -> Result<RelatedFileSet> {
    let key = naming::group_key(file.leaf_name());
    let dir = file.directory();
    let own_path = file.file_name();

    let mut files = vec![file.clone()];
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| MediaError::io("list", dir, e.into()))?;
        // symlinked siblings count, dangling links do not
        if !entry.path().is_file() {
            continue;
        }
        let Some(leaf) = entry.file_name().to_str() else {
            continue;
        };
        if naming::group_key(leaf) != key || entry.path() == own_path {
            continue;
        }

        match MediaFile::open_with(entry.path(), file.capabilities().clone()) {
            Ok(sibling) => files.push(sibling),
            Err(MediaError::NotFound { path }) => {
                debug!(path = %path.display(), "related file vanished while listing");
            }
            Err(e) => return Err(e),
        }
    }

    files.sort_by_cached_key(order_key);
    debug!(key = %key, members = files.len(), "resolved related files");

    Ok(RelatedFileSet { key, files })
}

impl MediaFile {
    /// Every file on disk belonging to the same logical asset
    pub fn related_files(&self) -> Result<RelatedFileSet> {
        related_files(self)
    }

    /// The JPEG of this asset: the file itself or its JPEG sibling
    pub fn jpeg(&self) -> Result<MediaFile> {
        if self.is_jpeg() {
            return Ok(self.clone());
        }

        let related = self.related_files()?;
        related
            .into_iter()
            .find(|f| f.is_jpeg())
            .ok_or_else(|| MediaError::NotFound {
                path: self.directory().join(format!("{}.jpg", self.base())),
            })
    }
}
