//! Filesystem operation abstractions for dependency injection.
//!
//! Script lookup and `push_file` go through [`FileSystemOps`] so that the
//! resolution chain can be unit-tested without touching the real
//! filesystem.  Production code uses [`SystemFileSystemOps`]; tests use
//! `MockFileSystemOps`.

use std::path::Path;

/// Abstraction over the filesystem queries made while composing a sequence.
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `path` is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Read the whole file at `path` as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, or not UTF-8.
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Mock [`FileSystemOps`] for unit tests.
///
/// # Example
///
/// ```ignore
/// let fs = MockFileSystemOps::new().with_file("./scripts/swap.sh", "fallocate -l 1G /swap");
/// ```
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFileSystemOps {
    files: std::collections::HashMap<std::path::PathBuf, String>,
    unreadable: std::collections::HashSet<std::path::PathBuf>,
}

#[cfg(test)]
impl MockFileSystemOps {
    /// Create an empty mock with nothing configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a regular file with the given contents.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<std::path::PathBuf>, contents: &str) -> Self {
        self.files.insert(path.into(), contents.to_string());
        self
    }

    /// Register a path that reports as a file but fails to read.
    #[must_use]
    pub fn with_unreadable(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.unreadable.insert(path.into());
        self
    }
}

#[cfg(test)]
impl FileSystemOps for MockFileSystemOps {
    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.unreadable.contains(path)
    }

    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        if self.unreadable.contains(path) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "mock: unreadable",
            ));
        }
        self.files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "mock: no such file")
        })
    }
}
