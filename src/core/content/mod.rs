//! # Content Module
//!
//! Reads file bytes and derives the content digest used for canonical names
//! and derivative cache keys.
//!
//! Large files are memory-mapped, which avoids copying them from kernel to
//! user space before hashing or decoding.

use memmap2::Mmap;
use std::fs::File;
use std::io;
use std::path::Path;
use xxhash_rust::xxh3::xxh3_128;

/// Minimum file size to use memory-mapped I/O (1MB)
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// Length of the short checksum embedded in canonical names
pub const CHECKSUM_LEN: usize = 8;

/// File bytes that may be either owned or memory-mapped.
pub enum FileBytes {
    Vec(Vec<u8>),
    Mmap(Mmap),
}

impl AsRef<[u8]> for FileBytes {
    fn as_ref(&self) -> &[u8] {
        match self {
            FileBytes::Vec(v) => v,
            FileBytes::Mmap(m) => m,
        }
    }
}

impl std::ops::Deref for FileBytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_ref()
    }
}

/// Read file bytes, memory-mapping files of 1MB and above.
pub fn read_file_bytes(path: &Path) -> io::Result<FileBytes> {
    let file = File::open(path)?;
    let len = file.metadata()?.len();

    if len >= MMAP_THRESHOLD {
        // SAFETY: the mapping is read-only and the file handle outlives it.
        // Concurrent truncation by another process is unsupported.
        let mmap = unsafe { Mmap::map(&file) }?;
        Ok(FileBytes::Mmap(mmap))
    } else {
        std::fs::read(path).map(FileBytes::Vec)
    }
}

/// Content digest as 32 lowercase hex characters
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:032x}", xxh3_128(bytes))
}

/// Short uppercase checksum derived from a content digest
pub fn short_checksum(hash: &str) -> String {
    hash.chars()
        .take(CHECKSUM_LEN)
        .collect::<String>()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn hash_is_stable_and_hex() {
        let a = content_hash(b"elephants");
        let b = content_hash(b"elephants");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn hash_changes_with_content() {
        assert_ne!(content_hash(b"elephants"), content_hash(b"elephant"));
    }

    #[test]
    fn checksum_is_eight_uppercase_chars() {
        let checksum = short_checksum("b6b8ab4f0123456789abcdef01234567");
        assert_eq!(checksum, "B6B8AB4F");
    }

    #[test]
    fn small_and_large_files_read_identically() {
        let dir = TempDir::new().unwrap();
        let small = dir.path().join("small.bin");
        let large = dir.path().join("large.bin");
        std::fs::write(&small, vec![7u8; 16]).unwrap();
        std::fs::write(&large, vec![7u8; MMAP_THRESHOLD as usize + 1]).unwrap();

        let small_bytes = read_file_bytes(&small).unwrap();
        let large_bytes = read_file_bytes(&large).unwrap();

        assert!(matches!(small_bytes, FileBytes::Vec(_)));
        assert!(matches!(large_bytes, FileBytes::Mmap(_)));
        assert_eq!(&large_bytes[..16], &small_bytes[..]);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_file_bytes(Path::new("/nonexistent/file.jpg")).is_err());
    }
}
