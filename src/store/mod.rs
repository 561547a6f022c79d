// src/store/mod.rs

//! Where build outputs live.
//!
//! The bundler writes its output through an [`ArtifactStore`]; the artifact
//! locator reads it back. [`DiskStore`] is the real filesystem,
//! [`memory::MemoryStore`] keeps everything in process so a build can be run
//! without touching disk.

use std::fmt::Debug;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::errors::{LivebuildError, Result};

pub mod memory;

pub use memory::MemoryStore;

/// Abstract path → bytes store.
pub trait ArtifactStore: Send + Sync + Debug {
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;

    /// Read the content stored at `path`.
    ///
    /// A missing entry is reported as [`LivebuildError::StoreRead`].
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    fn exists(&self, path: &Path) -> bool;

    /// Whether this store *is* the real filesystem, i.e. whatever the bundler
    /// wrote to disk is already visible through it.
    fn is_disk(&self) -> bool {
        false
    }
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct DiskStore;

impl ArtifactStore for DiskStore {
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        match fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(LivebuildError::StoreRead(path.to_path_buf()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_disk(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disk_store_round_trips_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dist/nested/bundle.js");

        DiskStore.write(&path, b"console.log(1)").unwrap();

        assert!(DiskStore.exists(&path));
        assert_eq!(DiskStore.read(&path).unwrap(), b"console.log(1)");
    }

    #[test]
    fn disk_store_missing_file_is_store_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.js");
        assert!(matches!(DiskStore.read(&path), Err(LivebuildError::StoreRead(p)) if p == path));
    }
}
