//! # Naming Module
//!
//! File name conventions and the canonical identity of a capture.
//!
//! ## Conventions
//! - OS copy suffixes (`"IMG_4120 copy"`, `"IMG_4120 (1)"`) are cosmetic and
//!   stripped from the base name
//! - Camera edits are marked by an inserted `E` (`IMG_E4120` edits
//!   `IMG_4120`); both belong to the same group but keep distinct names
//! - Stacked extensions (`IMG_4120.JPG.xmp`) reduce to the same base
//!
//! ## Canonical identity
//! `YYYYMMDD_HHMMSS_CHECKSUM`, built from the UTC capture time and the first
//! eight hex digits of the content digest.

use crate::core::classifier::TypeCategory;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

static COPY_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?: copy(?: \d+)?| \(\d+\))$").expect("copy suffix pattern is valid")
});

static EDITED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>[A-Z]{3})_E(?P<seq>\d{4,})$").expect("edited name pattern is valid")
});

static ORIGINAL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>[A-Z]{3})_(?P<seq>\d{4,})$").expect("original name pattern is valid")
});

/// Compact UTC timestamp format used in canonical names
pub const CANONICAL_DATE_FORMAT: &str = "%Y%m%d_%H%M%S";

/// How a file name relates to the logical asset it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NameVariant {
    /// The name the camera assigned
    Original,
    /// A camera/OS edit of the original (`IMG_E4120`)
    Edited,
    /// An OS-level duplicate (`IMG_4120 copy`, `IMG_4120 (1)`)
    Copy,
}

/// Strip trailing extensions that belong to known file types.
///
/// `IMG_4120.JPG.xmp` becomes `IMG_4120`, while `v1.2` keeps its dot
/// because `2` is not a known extension.
pub fn strip_extensions(leaf: &str) -> &str {
    let mut stem = leaf;
    while let Some(pos) = stem.rfind('.') {
        if pos == 0 {
            break;
        }
        let ext = &stem[pos + 1..];
        let known = TypeCategory::from_extension(ext) != TypeCategory::Unknown;
        // The outermost extension is always dropped, inner ones only if known
        if stem.len() != leaf.len() && !known {
            break;
        }
        stem = &stem[..pos];
    }
    stem
}

/// Remove OS copy suffixes, repeatedly (`"a copy (1)"` -> `"a"`)
pub fn strip_copy_suffix(stem: &str) -> &str {
    let mut current = stem;
    while let Some(m) = COPY_SUFFIX.find(current) {
        if m.start() == 0 {
            break;
        }
        current = &current[..m.start()];
    }
    current
}

/// Base name of a file: extensions and copy suffixes removed
pub fn base_name(leaf: &str) -> String {
    strip_copy_suffix(strip_extensions(leaf)).to_string()
}

/// Identity shared by every member of a related-file group
pub fn group_key(leaf: &str) -> String {
    let base = base_name(leaf);
    match EDITED_NAME.captures(&base) {
        Some(caps) => format!("{}_{}", &caps["prefix"], &caps["seq"]),
        None => base,
    }
}

/// Classify a file name as original, edit, or copy
pub fn variant(leaf: &str) -> NameVariant {
    let stem = strip_extensions(leaf);
    if strip_copy_suffix(stem).len() != stem.len() {
        NameVariant::Copy
    } else if EDITED_NAME.is_match(stem) {
        NameVariant::Edited
    } else {
        NameVariant::Original
    }
}

/// Stem of the edited counterpart of a camera original (`IMG_4120` -> `IMG_E4120`)
pub fn edited_stem(base: &str) -> Option<String> {
    ORIGINAL_NAME
        .captures(base)
        .map(|caps| format!("{}_E{}", &caps["prefix"], &caps["seq"]))
}

/// Display name derived from the file name alone: everything before the first dot
pub fn name_from_file(leaf: &str) -> &str {
    match leaf.char_indices().skip(1).find(|&(_, c)| c == '.') {
        Some((pos, _)) => &leaf[..pos],
        None => leaf,
    }
}

/// Canonical identity of a capture
pub fn canonical_name(taken: DateTime<Utc>, checksum: &str) -> String {
    format!("{}_{}", taken.format(CANONICAL_DATE_FORMAT), checksum)
}
