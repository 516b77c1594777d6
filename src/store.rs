//! File storage for attachments and their variants.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::upload::UploadError;

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("upload rejected: {0}")]
    UploadRejected(UploadError),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// File operations on stored attachment paths.
///
/// Paths are the strings kept in record attributes. [`resolve`] maps them to
/// real filesystem locations for the imaging backends.
///
/// [`resolve`]: FileStore::resolve
pub trait FileStore {
    /// Check if a file exists.
    fn exists(&self, path: &str) -> bool;

    /// Delete a file. Deleting a missing file succeeds.
    fn remove(&self, path: &str) -> StorageResult<()>;

    /// Create a directory and its parents if missing.
    fn ensure_dir(&self, path: &str) -> StorageResult<()>;

    /// Size in bytes.
    fn size(&self, path: &str) -> StorageResult<u64>;

    /// MIME type, sniffed from content where possible.
    fn mime_type(&self, path: &str) -> StorageResult<String>;

    /// Filesystem location of a stored path.
    fn resolve(&self, path: &str) -> PathBuf {
        PathBuf::from(path)
    }
}

/// Local filesystem storage
///
/// Relative paths are taken from `root` when one is set, from the working
/// directory otherwise.
#[derive(Debug, Clone, Default)]
pub struct LocalFileStore {
    root: Option<PathBuf>,
}

impl LocalFileStore {
    /// Storage relative to the working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage relative to `root`.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            root: Some(root.as_ref().to_path_buf()),
        }
    }
}

impl FileStore for LocalFileStore {
    fn exists(&self, path: &str) -> bool {
        !path.is_empty() && self.resolve(path).is_file()
    }

    fn remove(&self, path: &str) -> StorageResult<()> {
        let full = self.resolve(path);
        match fs::remove_file(&full) {
            Ok(()) => {
                debug!(path = ?full, "File deleted");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn ensure_dir(&self, path: &str) -> StorageResult<()> {
        if path.is_empty() && self.root.is_none() {
            return Ok(());
        }
        fs::create_dir_all(self.resolve(path))?;
        Ok(())
    }

    fn size(&self, path: &str) -> StorageResult<u64> {
        Ok(fs::metadata(self.resolve(path))?.len())
    }

    fn mime_type(&self, path: &str) -> StorageResult<String> {
        let full = self.resolve(path);
        if let Some(kind) = infer::get_from_path(&full)? {
            return Ok(kind.mime_type().to_string());
        }
        Ok(mime_guess::from_path(&full)
            .first_or_octet_stream()
            .to_string())
    }

    fn resolve(&self, path: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(path),
            None => PathBuf::from(path),
        }
    }
}
