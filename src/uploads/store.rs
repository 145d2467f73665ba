//! Storage capability for the upload pipeline.
//!
//! # Responsibilities
//! - Narrow filesystem surface: write, remove, exists, provision
//! - Atomic writes: the full file appears at the final path or not at all
//!
//! # Design Decisions
//! - The pipeline's validation and naming logic only sees this trait, so it
//!   is testable without touching a real disk
//! - `remove` reports whether the file existed; absence is not an error

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Filesystem effects used by the upload pipeline.
pub trait StorageBackend: Send + Sync {
    /// Write `bytes` to `path`, atomically replacing any previous content.
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;

    /// Remove the file at `path`. Returns `false` when it was already absent.
    fn remove(&self, path: &Path) -> io::Result<bool>;

    /// Whether a file currently exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Create `dir` and any missing parents. Idempotent.
    fn provision(&self, dir: &Path) -> io::Result<()>;
}

/// Local-filesystem store.
#[derive(Debug, Default)]
pub struct FsStore;

impl FsStore {
    pub fn new() -> Self {
        Self
    }
}

impl StorageBackend for FsStore {
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        // Stage next to the final path, then rename: rename within one
        // directory is atomic, so a crash mid-write never leaves a partial
        // file at the public name.
        let staging = staging_path(path);
        fs::write(&staging, bytes)?;
        match fs::rename(&staging, path) {
            Ok(()) => Ok(()),
            Err(e) => {
                let _ = fs::remove_file(&staging);
                Err(e)
            }
        }
    }

    fn remove(&self, path: &Path) -> io::Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn provision(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".partial");
    PathBuf::from(name)
}

/// In-memory store for pipeline unit tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: dashmap::DashMap<PathBuf, Vec<u8>>,
    dirs: dashmap::DashMap<PathBuf, ()>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.get(path).map(|r| r.value().clone())
    }
}

#[cfg(test)]
impl StorageBackend for MemoryStore {
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        self.files.insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    fn remove(&self, path: &Path) -> io::Result<bool> {
        Ok(self.files.remove(path).is_some())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn provision(&self, dir: &Path) -> io::Result<()> {
        self.dirs.insert(dir.to_path_buf(), ());
        Ok(())
    }
}
