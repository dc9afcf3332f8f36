//! Scoped filesystem paths
//!
//! A `ScopedPath` owns a temporary file or directory and removes it when
//! dropped, on success and error paths alike.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct ScopedPath {
    path: PathBuf,
}

impl ScopedPath {
    /// Take ownership of an existing or soon-to-exist path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write `contents` to `path` and own the resulting file
    pub fn write(path: impl Into<PathBuf>, contents: impl AsRef<[u8]>) -> io::Result<Self> {
        let scoped = Self::new(path);
        if let Some(parent) = scoped.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&scoped.path, contents)?;
        Ok(scoped)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScopedPath {
    fn drop(&mut self) {
        let result = if self.path.is_dir() {
            fs::remove_dir_all(&self.path)
        } else {
            fs::remove_file(&self.path)
        };
        match result {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.path.display(), "failed to remove: {}", e),
        }
    }
}
