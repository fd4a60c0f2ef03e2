//! # Media File Module
//!
//! A handle on one file on disk: its classification, lazily extracted
//! metadata, content digest and canonical identity.
//!
//! ## Lifetime rules
//! - Existence is checked once, at construction
//! - Derived properties are computed at most once and never change for the
//!   lifetime of the handle
//! - Only [`MediaFile::move_to`] changes the location of a handle
//!
//! ## Example
//! ```rust,ignore
//! use media_identity::core::MediaFile;
//!
//! let file = MediaFile::open("/photos/IMG_4120.JPG")?;
//! println!("{} {}", file.canonical_name()?, file.mime_type());
//! ```

mod ops;

use crate::core::classifier::{self, Classification, TypeCategory};
use crate::core::content::{self, FileBytes};
use crate::core::derive::{ImageCodec, RasterCodec};
use crate::core::metadata::{ExifExtractor, Metadata, MetadataExtractor};
use crate::core::naming;
use crate::error::{ExtractionError, MediaError, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// The delegated capabilities a handle uses for metadata and pixels
#[derive(Clone)]
pub struct Capabilities {
    pub extractor: Arc<dyn MetadataExtractor>,
    pub codec: Arc<dyn ImageCodec>,
}

impl Capabilities {
    pub fn new(extractor: Arc<dyn MetadataExtractor>, codec: Arc<dyn ImageCodec>) -> Self {
        Self { extractor, codec }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            extractor: Arc::new(ExifExtractor::new()),
            codec: Arc::new(RasterCodec::new()),
        }
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}

/// One file on disk at a point in time
#[derive(Debug, Clone)]
pub struct MediaFile {
    /// Absolute directory
    dir: PathBuf,
    /// Current leaf name
    name: String,
    classification: Classification,
    caps: Capabilities,
    hash: OnceLock<String>,
    metadata: OnceLock<std::result::Result<Arc<Metadata>, ExtractionError>>,
    dimensions: OnceLock<std::result::Result<(u32, u32), ExtractionError>>,
    date_created: OnceLock<DateTime<Utc>>,
}

impl MediaFile {
    /// Open a handle with the default capabilities.
    ///
    /// Fails with [`MediaError::NotFound`] if `path` does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, Capabilities::default())
    }

    /// Open a handle using the given extraction and codec backends
    pub fn open_with(path: impl AsRef<Path>, caps: Capabilities) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MediaError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let absolute = std::path::absolute(path).map_err(|e| MediaError::io("resolve", path, e))?;
        let (dir, name) = split_path(&absolute)?;
        let classification = classifier::classify(&absolute);
        debug!(path = %absolute.display(), category = %classification.category, "opened media file");

        Ok(Self {
            dir,
            name,
            classification,
            caps,
            hash: OnceLock::new(),
            metadata: OnceLock::new(),
            dimensions: OnceLock::new(),
            date_created: OnceLock::new(),
        })
    }

    pub(crate) fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    // ----- paths -----

    /// Full path of the file
    pub fn file_name(&self) -> PathBuf {
        self.dir.join(&self.name)
    }

    /// Leaf name including extension
    pub fn leaf_name(&self) -> &str {
        &self.name
    }

    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// Base name without extensions and copy suffixes (`IMG_4120 (1).JPG` -> `IMG_4120`)
    pub fn base(&self) -> String {
        naming::base_name(&self.name)
    }

    /// Extension with its leading dot, as written on disk (`.JPG`)
    pub fn extension(&self) -> String {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default()
    }

    /// Full path relative to `dir`, or the full path if it is not below `dir`
    pub fn relative_name(&self, dir: impl AsRef<Path>) -> PathBuf {
        let full = self.file_name();
        full.strip_prefix(dir.as_ref())
            .map(Path::to_path_buf)
            .unwrap_or(full)
    }

    /// Directory relative to `dir`; empty if they are equal
    pub fn relative_path(&self, dir: impl AsRef<Path>) -> PathBuf {
        self.dir
            .strip_prefix(dir.as_ref())
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| self.dir.clone())
    }

    /// Base name joined to the directory relative to `dir`
    pub fn relative_base(&self, dir: impl AsRef<Path>) -> PathBuf {
        self.relative_path(dir).join(self.base())
    }

    /// Whether the file is still on disk
    pub fn exists(&self) -> bool {
        self.file_name().is_file()
    }

    /// Size in bytes, 0 if the file vanished
    pub fn size(&self) -> u64 {
        std::fs::metadata(self.file_name())
            .map(|m| m.len())
            .unwrap_or(0)
    }

    // ----- classification -----

    pub fn category(&self) -> TypeCategory {
        self.classification.category
    }

    pub fn mime_type(&self) -> &str {
        &self.classification.mime
    }

    pub fn has_type(&self, category: TypeCategory) -> bool {
        self.category() == category
    }

    fn extension_is(&self, candidates: &[&str]) -> bool {
        let ext = self.extension().to_lowercase();
        candidates.iter().any(|c| ext == *c)
    }

    pub fn is_jpeg(&self) -> bool {
        self.has_type(TypeCategory::Photo)
    }

    pub fn is_png(&self) -> bool {
        self.mime_type() == "image/png" || self.extension_is(&[".png"])
    }

    pub fn is_tiff(&self) -> bool {
        self.is_image_other() && self.mime_type() == "image/tiff"
    }

    pub fn is_heif(&self) -> bool {
        self.has_type(TypeCategory::HeifPhoto)
    }

    pub fn is_raw(&self) -> bool {
        self.has_type(TypeCategory::RawPhoto)
    }

    pub fn is_image_other(&self) -> bool {
        self.has_type(TypeCategory::OtherImage)
    }

    pub fn is_sidecar(&self) -> bool {
        self.has_type(TypeCategory::Sidecar)
    }

    /// JPEG, RAW or HEIF
    pub fn is_photo(&self) -> bool {
        self.category().is_photo()
    }

    pub fn is_video(&self) -> bool {
        self.has_type(TypeCategory::Video)
    }

    // ----- content -----

    /// Read the file contents
    pub fn read_bytes(&self) -> Result<FileBytes> {
        let path = self.file_name();
        content::read_file_bytes(&path).map_err(|e| MediaError::io("read", path, e))
    }

    /// Content digest (32 lowercase hex characters), computed once
    pub fn hash(&self) -> Result<String> {
        if let Some(hash) = self.hash.get() {
            return Ok(hash.clone());
        }
        let bytes = self.read_bytes()?;
        let hash = content::content_hash(&bytes);
        Ok(self.hash.get_or_init(|| hash).clone())
    }

    /// Eight uppercase hex characters of the content digest
    pub fn checksum(&self) -> Result<String> {
        Ok(content::short_checksum(&self.hash()?))
    }

    // ----- metadata -----

    /// Extracted metadata, computed once per handle
    pub fn metadata(&self) -> std::result::Result<Arc<Metadata>, ExtractionError> {
        self.metadata
            .get_or_init(|| self.extract_metadata().map(Arc::new))
            .clone()
    }

    fn extract_metadata(&self) -> std::result::Result<Metadata, ExtractionError> {
        let path = self.file_name();
        let category = self.category();
        if !matches!(
            category,
            TypeCategory::Photo
                | TypeCategory::RawPhoto
                | TypeCategory::HeifPhoto
                | TypeCategory::OtherImage
                | TypeCategory::Video
        ) {
            return Err(ExtractionError::NotAPhoto { path });
        }

        let bytes = content::read_file_bytes(&path).map_err(|e| ExtractionError::Read {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        self.caps.extractor.extract(&bytes, category, &path)
    }

    /// Metadata or zero values if extraction failed
    fn meta_or_default(&self) -> Arc<Metadata> {
        self.metadata().unwrap_or_default()
    }

    /// Decode width and height.
    ///
    /// Fails with `NotAPhoto` for non-image categories. JPEG and other raster
    /// formats read the image header; RAW and HEIF use the embedded metadata.
    pub fn decode_dimensions(&self) -> std::result::Result<(u32, u32), ExtractionError> {
        self.dimensions
            .get_or_init(|| self.compute_dimensions())
            .clone()
    }

    fn compute_dimensions(&self) -> std::result::Result<(u32, u32), ExtractionError> {
        let path = self.file_name();
        let category = self.category();
        if !category.is_image() {
            return Err(ExtractionError::NotAPhoto { path });
        }

        if matches!(category, TypeCategory::RawPhoto | TypeCategory::HeifPhoto) {
            let meta = self.metadata()?;
            if meta.width > 0 && meta.height > 0 {
                return Ok((meta.width, meta.height));
            }
        }

        let bytes = content::read_file_bytes(&path).map_err(|e| ExtractionError::Read {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        match self.caps.codec.dimensions(&bytes, category) {
            Ok((w, h)) if w > 0 && h > 0 => Ok((w, h)),
            Ok((w, h)) => Err(ExtractionError::Dimensions {
                path,
                reason: format!("empty image {}x{}", w, h),
            }),
            Err(e) => Err(ExtractionError::Dimensions {
                path,
                reason: e.to_string(),
            }),
        }
    }

    /// Width in pixels, 0 if unknown
    pub fn width(&self) -> u32 {
        self.decode_dimensions().map(|(w, _)| w).unwrap_or(0)
    }

    /// Height in pixels, 0 if unknown
    pub fn height(&self) -> u32 {
        self.decode_dimensions().map(|(_, h)| h).unwrap_or(0)
    }

    /// Width divided by height, 0 if either is unknown
    pub fn aspect_ratio(&self) -> f64 {
        match self.decode_dimensions() {
            Ok((w, h)) if w > 0 && h > 0 => w as f64 / h as f64,
            _ => 0.0,
        }
    }

    pub fn megapixels(&self) -> f64 {
        (self.width() as f64 * self.height() as f64) / 1_000_000.0
    }

    /// EXIF orientation; images without one are upright (1), other files 0
    pub fn orientation(&self) -> u16 {
        match self.meta_or_default().orientation {
            0 if self.category().is_image() => 1,
            o => o,
        }
    }

    pub fn camera_make(&self) -> String {
        self.meta_or_default().camera_make.clone()
    }

    pub fn camera_model(&self) -> String {
        self.meta_or_default().camera_model.clone()
    }

    /// `"Apple iPhone SE"`, or `None` without camera fields
    pub fn camera_display(&self) -> Option<String> {
        self.meta_or_default().camera_display()
    }

    pub fn lens_make(&self) -> String {
        self.meta_or_default().lens_make.clone()
    }

    pub fn lens_model(&self) -> String {
        self.meta_or_default().lens_model.clone()
    }

    pub fn exposure(&self) -> String {
        self.meta_or_default().exposure.clone()
    }

    pub fn f_number(&self) -> f64 {
        self.meta_or_default().f_number
    }

    pub fn iso(&self) -> u32 {
        self.meta_or_default().iso
    }

    pub fn focal_length(&self) -> f64 {
        self.meta_or_default().focal_length
    }

    pub fn has_location(&self) -> bool {
        self.meta_or_default().has_location
    }

    pub fn has_time_and_place(&self) -> bool {
        self.meta_or_default().has_time_and_place()
    }

    /// Capture time in UTC: embedded timestamp, else modification time
    pub fn date_created(&self) -> DateTime<Utc> {
        *self.date_created.get_or_init(|| {
            if let Some(taken) = self.meta_or_default().taken_at {
                return taken;
            }
            debug!(path = %self.file_name().display(), "no capture time, using modification time");
            std::fs::metadata(self.file_name())
                .and_then(|m| m.modified())
                .map(DateTime::<Utc>::from)
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        })
    }

    // ----- naming -----

    /// Content- and capture-time-derived identity, independent of the path
    pub fn canonical_name(&self) -> Result<String> {
        Ok(naming::canonical_name(self.date_created(), &self.checksum()?))
    }

    /// Display name from the current file name (`beach_wood.jpg` -> `beach_wood`)
    pub fn canonical_name_from_file(&self) -> String {
        naming::name_from_file(&self.name).to_string()
    }

    /// [`canonical_name_from_file`](Self::canonical_name_from_file) inside the file's directory
    pub fn canonical_name_from_file_with_directory(&self) -> PathBuf {
        self.dir.join(self.canonical_name_from_file())
    }

    /// Path of the camera-edited counterpart (`IMG_E4120.JPG` for
    /// `IMG_4120.JPG`) if it exists on disk
    pub fn edited_name(&self) -> Option<PathBuf> {
        let stem = naming::edited_stem(&self.base())?;
        let candidate = self.dir.join(format!("{}{}", stem, self.extension()));
        candidate.is_file().then_some(candidate)
    }
}

fn split_path(path: &Path) -> Result<(PathBuf, String)> {
    let dir = path.parent().map(Path::to_path_buf);
    let name = path.file_name().and_then(|n| n.to_str()).map(str::to_string);
    match (dir, name) {
        (Some(dir), Some(name)) => Ok((dir, name)),
        _ => Err(MediaError::io(
            "resolve",
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file path"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::{self, ascii, short};
    use crate::error::ErrorKind;
    use exif::Tag;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    fn elephants(dir: &TempDir) -> PathBuf {
        write(
            dir,
            "elephants.jpg",
            &fixtures::jpeg_with_exif(
                497,
                331,
                &[
                    ascii(Tag::DateTimeOriginal, "2013:11:26 13:53:55"),
                    ascii(Tag::Make, "Canon"),
                    short(Tag::Orientation, 1),
                ],
            ),
        )
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = MediaFile::open("/nonexistent/xxz.jpg").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn date_created_uses_embedded_capture_time() {
        let dir = TempDir::new().unwrap();
        let file = MediaFile::open(elephants(&dir)).unwrap();
        assert_eq!(file.date_created().to_string(), "2013-11-26 13:53:55 UTC");
    }

    #[test]
    fn date_created_falls_back_to_modification_time() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "plain.jpg", &fixtures::jpeg_bytes(8, 8));
        let modified: DateTime<Utc> = fs::metadata(&path).unwrap().modified().unwrap().into();

        let file = MediaFile::open(&path).unwrap();
        assert_eq!(file.date_created(), modified);
    }

    #[test]
    fn dimensions_and_aspect_ratio() {
        let dir = TempDir::new().unwrap();
        let file = MediaFile::open(elephants(&dir)).unwrap();
        assert_eq!(file.width(), 497);
        assert_eq!(file.height(), 331);
        assert!((file.aspect_ratio() - 497.0 / 331.0).abs() < 1e-12);
        assert!((file.megapixels() - 497.0 * 331.0 / 1e6).abs() < 1e-12);
    }

    #[test]
    fn non_image_is_not_a_photo() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "Random.docx", b"PK\x03\x04 not really a document");
        let file = MediaFile::open(&path).unwrap();

        let err = file.decode_dimensions().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAPhoto);
        assert_eq!(err.to_string(), format!("not a photo: {}", file.file_name().display()));
        assert_eq!(file.width(), 0);
        assert_eq!(file.height(), 0);
        assert_eq!(file.aspect_ratio(), 0.0);
        assert_eq!(file.megapixels(), 0.0);
    }

    #[test]
    fn heif_without_metadata_dimensions_fails_softly() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "iphone_7.heic", b"\0\0\0\x18ftypheic\0\0\0\0mif1heic");
        let file = MediaFile::open(&path).unwrap();

        assert!(file.is_heif());
        assert_eq!(file.mime_type(), "application/octet-stream");
        assert_eq!(file.aspect_ratio(), 0.0);
    }

    #[test]
    fn metadata_accessors_use_zero_values_on_failure() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "broken.jpg", b"this is not a valid image file");
        let file = MediaFile::open(&path).unwrap();

        assert_eq!(file.metadata().unwrap_err().kind(), ErrorKind::ExtractionFailure);
        assert_eq!(file.camera_make(), "");
        assert_eq!(file.iso(), 0);
        assert!(!file.has_time_and_place());
    }

    #[test]
    fn orientation_defaults_to_upright_for_images() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "turtle.jpg", &fixtures::jpeg_bytes(8, 8));
        assert_eq!(MediaFile::open(&path).unwrap().orientation(), 1);
    }

    #[test]
    fn canonical_name_is_stable_across_renames() {
        let dir = TempDir::new().unwrap();
        let path = elephants(&dir);
        let first = MediaFile::open(&path).unwrap().canonical_name().unwrap();
        let again = MediaFile::open(&path).unwrap().canonical_name().unwrap();
        assert_eq!(first, again);
        assert!(first.starts_with("20131126_135355_"));
        assert_eq!(first.len(), "20131126_135355_".len() + 8);

        let renamed = dir.path().join("renamed.jpg");
        fs::rename(&path, &renamed).unwrap();
        assert_eq!(MediaFile::open(&renamed).unwrap().canonical_name().unwrap(), first);
    }

    #[test]
    fn name_from_file_forms() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "beach_wood.jpg", &fixtures::jpeg_bytes(8, 8));
        let file = MediaFile::open(&path).unwrap();

        assert_eq!(file.canonical_name_from_file(), "beach_wood");
        assert_eq!(
            file.canonical_name_from_file_with_directory(),
            file.directory().join("beach_wood")
        );
    }

    #[test]
    fn path_accessors() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("examples")).unwrap();
        let path = dir.path().join("examples").join("IMG_4120 (1).JPG");
        fs::write(&path, fixtures::jpeg_bytes(8, 8)).unwrap();
        let file = MediaFile::open(&path).unwrap();

        assert_eq!(file.base(), "IMG_4120");
        assert_eq!(file.extension(), ".JPG");
        assert_eq!(
            file.relative_name(dir.path()),
            PathBuf::from("examples/IMG_4120 (1).JPG")
        );
        assert_eq!(file.relative_path(dir.path()), PathBuf::from("examples"));
        assert_eq!(file.relative_path(dir.path().join("examples")), PathBuf::new());
        assert_eq!(file.relative_base(dir.path()), PathBuf::from("examples/IMG_4120"));
        assert_eq!(file.relative_path("xxx"), file.directory());
    }

    #[test]
    fn type_predicates() {
        let dir = TempDir::new().unwrap();
        let jpeg = MediaFile::open(write(&dir, "a.jpg", &fixtures::jpeg_bytes(8, 8))).unwrap();
        let png = MediaFile::open(write(&dir, "b.png", &fixtures::png_bytes(8, 8))).unwrap();
        let raw = MediaFile::open(write(&dir, "c.dng", b"II*\0\x08\0\0\0")).unwrap();
        let xmp = MediaFile::open(write(&dir, "c.xmp", b"<x:xmpmeta/>")).unwrap();
        let video = MediaFile::open(write(&dir, "d.mp4", b"\0\0\0\x18ftypisom\0\0\0\0")).unwrap();

        assert!(jpeg.is_jpeg() && jpeg.is_photo() && !jpeg.is_image_other());
        assert!(png.is_png() && png.is_image_other() && !png.is_photo());
        assert!(raw.is_raw() && raw.is_photo() && !raw.is_tiff());
        assert!(xmp.is_sidecar() && !xmp.is_photo());
        assert_eq!(xmp.mime_type(), "text/plain; charset=utf-8");
        assert!(video.is_video() && !video.is_photo());
        assert_eq!(video.mime_type(), "video/mp4");
    }

    #[test]
    fn edited_name_points_at_existing_edit() {
        let dir = TempDir::new().unwrap();
        let original = write(&dir, "IMG_4120.JPG", &fixtures::jpeg_bytes(8, 8));
        let plain = write(&dir, "fern_green.jpg", &fixtures::jpeg_bytes(8, 8));

        let file = MediaFile::open(&original).unwrap();
        assert_eq!(file.edited_name(), None);

        write(&dir, "IMG_E4120.JPG", &fixtures::jpeg_bytes(8, 8));
        assert_eq!(file.edited_name(), Some(file.directory().join("IMG_E4120.JPG")));
        assert_eq!(MediaFile::open(&plain).unwrap().edited_name(), None);
    }

    #[test]
    fn exists_tracks_out_of_band_removal() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "cat_black.jpg", &fixtures::jpeg_bytes(8, 8));
        let file = MediaFile::open(&path).unwrap();
        assert!(file.exists());

        fs::remove_file(&path).unwrap();
        assert!(!file.exists());
    }
}
