//! Relocation of media files on disk.

use super::{split_path, MediaFile};
use crate::error::{MediaError, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

impl MediaFile {
    /// Move the file to `dest` (a full file path) and update this handle.
    ///
    /// Parent directories are created as needed. Across filesystems the
    /// move falls back to copy, size verification and removal of the
    /// source. On failure the handle keeps its old location.
    pub fn move_to(&mut self, dest: impl AsRef<Path>) -> Result<()> {
        let source = self.file_name();
        let dest = std::path::absolute(dest.as_ref())
            .map_err(|e| MediaError::io("resolve", dest.as_ref(), e))?;
        let (dir, name) = split_path(&dest)?;

        if source == dest {
            return Ok(());
        }
        if !source.exists() {
            return Err(MediaError::NotFound { path: source });
        }

        fs::create_dir_all(&dir).map_err(|e| MediaError::io("create directory", &dir, e))?;
        relocate(&source, &dest).map_err(|e| MediaError::io("move", &source, e))?;

        info!(from = %source.display(), to = %dest.display(), "moved media file");
        self.dir = dir;
        self.name = name;
        Ok(())
    }

    /// Copy the file to `dest` and return a handle on the copy.
    ///
    /// This handle stays on the source file. Copying onto the source
    /// itself leaves the file untouched and returns a handle on it.
    pub fn copy_to(&self, dest: impl AsRef<Path>) -> Result<MediaFile> {
        let source = self.file_name();
        let dest = std::path::absolute(dest.as_ref())
            .map_err(|e| MediaError::io("resolve", dest.as_ref(), e))?;
        let dest = dest.as_path();
        if !source.exists() {
            return Err(MediaError::NotFound { path: source });
        }
        if same_file(&source, dest) {
            debug!(path = %source.display(), "copy onto itself, nothing to do");
            return Ok(self.clone());
        }

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| MediaError::io("create directory", parent, e))?;
        }
        fs::copy(&source, dest).map_err(|e| MediaError::io("copy", &source, e))?;
        debug!(from = %source.display(), to = %dest.display(), "copied media file");

        let copy = MediaFile::open_with(dest, self.capabilities().clone())?;
        if let Some(hash) = self.hash.get() {
            let _ = copy.hash.set(hash.clone());
        }
        Ok(copy)
    }
}

/// True when both paths name one file, directly or through links
fn same_file(source: &Path, dest: &Path) -> bool {
    if source == dest {
        return true;
    }
    match (fs::canonicalize(source), fs::canonicalize(dest)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn relocate(source: &Path, dest: &Path) -> std::io::Result<()> {
    fs::rename(source, dest).or_else(|_| {
        // rename fails across filesystems, fall back to copy+delete
        let source_size = fs::metadata(source)?.len();
        fs::copy(source, dest)?;

        let dest_size = fs::metadata(dest)?.len();
        if dest_size != source_size {
            let _ = fs::remove_file(dest);
            return Err(std::io::Error::other(format!(
                "copy verification failed: source {} bytes, dest {} bytes",
                source_size, dest_size
            )));
        }

        // the move did not happen, so the copy must not stay behind
        if let Err(e) = fs::remove_file(source) {
            let _ = fs::remove_file(dest);
            return Err(e);
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use crate::core::fixtures;
    use crate::core::MediaFile;
    use crate::error::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn move_updates_the_handle() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("table_white.jpg");
        fs::write(&source, fixtures::jpeg_bytes(16, 16)).unwrap();

        let mut file = MediaFile::open(&source).unwrap();
        let hash = file.hash().unwrap();
        let dest = dir.path().join("moved").join("nested").join("table_white.jpg");
        file.move_to(&dest).unwrap();

        assert!(!source.exists());
        assert!(dest.exists());
        assert_eq!(file.file_name(), dest);
        assert_eq!(file.hash().unwrap(), hash);
        assert!(file.exists());
    }

    #[test]
    fn move_onto_itself_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("same.jpg");
        fs::write(&source, fixtures::jpeg_bytes(8, 8)).unwrap();

        let mut file = MediaFile::open(&source).unwrap();
        file.move_to(&source).unwrap();
        assert!(source.exists());
    }

    #[test]
    fn failed_move_keeps_the_old_location() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("gone.jpg");
        fs::write(&source, fixtures::jpeg_bytes(8, 8)).unwrap();

        let mut file = MediaFile::open(&source).unwrap();
        fs::remove_file(&source).unwrap();

        let err = file.move_to(dir.path().join("elsewhere.jpg")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(file.file_name(), source);
    }

    #[test]
    fn copy_returns_a_new_handle() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("original.jpg");
        fs::write(&source, fixtures::jpeg_bytes(16, 16)).unwrap();

        let file = MediaFile::open(&source).unwrap();
        let dest = dir.path().join("copies").join("duplicate.jpg");
        let copy = file.copy_to(&dest).unwrap();

        assert!(source.exists());
        assert_eq!(file.file_name(), source);
        assert_eq!(copy.file_name(), dest);
        assert_eq!(copy.hash().unwrap(), file.hash().unwrap());
        assert_eq!(fs::read(&dest).unwrap(), fs::read(&source).unwrap());
    }

    #[test]
    fn copy_onto_itself_keeps_the_content() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("original.jpg");
        let bytes = fixtures::jpeg_bytes(16, 16);
        fs::write(&source, &bytes).unwrap();

        let file = MediaFile::open(&source).unwrap();
        let copy = file.copy_to(&source).unwrap();
        assert_eq!(copy.file_name(), source);
        assert_eq!(fs::read(&source).unwrap(), bytes);

        let dotted = dir.path().join(".").join("original.jpg");
        file.copy_to(&dotted).unwrap();
        assert_eq!(fs::read(&source).unwrap(), bytes);
    }

    #[cfg(unix)]
    #[test]
    fn failed_source_removal_leaves_no_copy_behind() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        let source = locked.join("pinned.jpg");
        fs::write(&source, fixtures::jpeg_bytes(8, 8)).unwrap();
        let mut file = MediaFile::open(&source).unwrap();

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();
        // privileged users ignore directory permissions
        if fs::write(locked.join("canary"), b"").is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let dest = dir.path().join("out").join("pinned.jpg");
        let err = file.move_to(&dest).unwrap_err();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(err.kind(), ErrorKind::Filesystem);
        assert!(source.exists());
        assert!(!dest.exists());
        assert_eq!(file.file_name(), source);
    }
}
