//! Named rendering profiles.

use crate::error::{MediaError, ThumbnailError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Transform options of a rendering profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleOption {
    /// Scale down to fit inside the box, keeping the aspect ratio
    Fit,
    /// Scale and crop to fill the box, keeping the center
    FillCenter,
    /// Scale and crop to fill the box, keeping the top left corner
    FillTopLeft,
    /// Scale and crop to fill the box, keeping the bottom right corner
    FillBottomRight,
    /// Stretch to the exact box size
    Resize,
    /// Nearest neighbor instead of Lanczos3
    NearestNeighbor,
    /// Encode as PNG instead of JPEG
    Png,
}

impl ResampleOption {
    /// Token used in derivative file names
    pub fn token(&self) -> &'static str {
        match self {
            ResampleOption::Fit => "fit",
            ResampleOption::FillCenter => "center",
            ResampleOption::FillTopLeft => "left",
            ResampleOption::FillBottomRight => "right",
            ResampleOption::Resize => "resize",
            ResampleOption::NearestNeighbor => "nearest",
            ResampleOption::Png => "png",
        }
    }
}

/// How the source is mapped onto the target box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMode {
    Fit,
    Fill(Anchor),
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Center,
    TopLeft,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

/// A named (width, height, options) triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderProfile {
    pub name: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub options: Vec<ResampleOption>,
    /// Part of the standard set rendered by `resample_default`
    #[serde(default)]
    pub default_set: bool,
}

impl RenderProfile {
    pub fn new(name: &str, width: u32, height: u32, options: &[ResampleOption]) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            options: options.to_vec(),
            default_set: false,
        }
    }

    /// Mark this profile as part of the standard set
    pub fn standard(mut self) -> Self {
        self.default_set = true;
        self
    }

    fn has(&self, option: ResampleOption) -> bool {
        self.options.contains(&option)
    }

    pub fn mode(&self) -> FitMode {
        if self.has(ResampleOption::FillCenter) {
            FitMode::Fill(Anchor::Center)
        } else if self.has(ResampleOption::FillTopLeft) {
            FitMode::Fill(Anchor::TopLeft)
        } else if self.has(ResampleOption::FillBottomRight) {
            FitMode::Fill(Anchor::BottomRight)
        } else if self.has(ResampleOption::Resize) {
            FitMode::Stretch
        } else {
            FitMode::Fit
        }
    }

    pub fn nearest_neighbor(&self) -> bool {
        self.has(ResampleOption::NearestNeighbor)
    }

    pub fn format(&self) -> OutputFormat {
        if self.has(ResampleOption::Png) {
            OutputFormat::Png
        } else {
            OutputFormat::Jpeg
        }
    }

    pub fn extension(&self) -> &'static str {
        match self.format() {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Derivative file name for a content digest.
    ///
    /// JPEG output carries the encoder quality as a trailing `q<N>` token,
    /// since the same geometry at another quality is different bytes.
    pub fn file_name(&self, hash: &str, jpeg_quality: u8) -> String {
        let mut tokens: Vec<String> = self.options.iter().map(|o| o.token().to_string()).collect();
        if self.format() == OutputFormat::Jpeg {
            tokens.push(format!("q{}", jpeg_quality));
        }
        if tokens.is_empty() {
            format!("{}_{}x{}.{}", hash, self.width, self.height, self.extension())
        } else {
            format!(
                "{}_{}x{}_{}.{}",
                hash,
                self.width,
                self.height,
                tokens.join("_"),
                self.extension()
            )
        }
    }

    /// Derivative path under `root`, sharded by the first three hash digits
    pub fn derivative_path(&self, root: &Path, hash: &str, jpeg_quality: u8) -> PathBuf {
        let mut path = root.to_path_buf();
        for c in hash.chars().take(3) {
            path.push(c.to_string());
        }
        path.push(self.file_name(hash, jpeg_quality));
        path
    }
}

/// Closed, ordered table of rendering profiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RenderProfile>", into = "Vec<RenderProfile>")]
pub struct ProfileTable {
    profiles: Vec<RenderProfile>,
}

impl ProfileTable {
    /// Build a table, rejecting empty and duplicate names
    pub fn new(profiles: Vec<RenderProfile>) -> Result<Self, MediaError> {
        let mut seen = HashSet::new();
        for profile in &profiles {
            if profile.name.trim().is_empty() {
                return Err(MediaError::ProfileTable("profile name must not be empty".to_string()));
            }
            if !seen.insert(profile.name.as_str()) {
                return Err(MediaError::ProfileTable(format!(
                    "duplicate profile name {}",
                    profile.name
                )));
            }
        }
        Ok(Self { profiles })
    }

    /// The built-in thumbnail set
    pub fn standard() -> Self {
        use ResampleOption::*;

        Self {
            profiles: vec![
                RenderProfile::new("colors", 3, 3, &[Resize, NearestNeighbor, Png]),
                RenderProfile::new("left_224", 224, 224, &[FillTopLeft]),
                RenderProfile::new("right_224", 224, 224, &[FillBottomRight]),
                RenderProfile::new("tile_50", 50, 50, &[FillCenter]).standard(),
                RenderProfile::new("tile_100", 100, 100, &[FillCenter]).standard(),
                RenderProfile::new("tile_224", 224, 224, &[FillCenter]).standard(),
                RenderProfile::new("tile_500", 500, 500, &[FillCenter]).standard(),
                RenderProfile::new("fit_720", 720, 720, &[Fit]).standard(),
                RenderProfile::new("fit_1280", 1280, 1024, &[Fit]).standard(),
                RenderProfile::new("fit_1920", 1920, 1200, &[Fit]).standard(),
                RenderProfile::new("fit_2048", 2048, 2048, &[Fit]),
                RenderProfile::new("fit_2560", 2560, 1600, &[Fit]),
                RenderProfile::new("fit_3840", 3840, 2400, &[Fit]),
            ],
        }
    }

    /// Load a table from a JSON array of profiles
    pub fn from_json_file(path: &Path) -> Result<Self, MediaError> {
        let text =
            std::fs::read_to_string(path).map_err(|e| MediaError::io("read", path, e))?;
        let profiles: Vec<RenderProfile> = serde_json::from_str(&text)
            .map_err(|e| MediaError::ProfileTable(format!("{}: {}", path.display(), e)))?;
        Self::new(profiles)
    }

    /// Resolve a profile by name
    pub fn get(&self, name: &str) -> Result<&RenderProfile, ThumbnailError> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ThumbnailError::InvalidProfile {
                name: name.to_string(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderProfile> {
        self.profiles.iter()
    }

    /// Profiles in the standard set, in table order
    pub fn defaults(&self) -> impl Iterator<Item = &RenderProfile> {
        self.profiles.iter().filter(|p| p.default_set)
    }

    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<RenderProfile>> for ProfileTable {
    type Error = MediaError;

    fn try_from(profiles: Vec<RenderProfile>) -> Result<Self, Self::Error> {
        Self::new(profiles)
    }
}

impl From<ProfileTable> for Vec<RenderProfile> {
    fn from(table: ProfileTable) -> Self {
        table.profiles
    }
}
