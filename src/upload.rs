//! Uploaded files waiting to be attached.
//!
//! Parsing multipart requests is the web layer's job. It registers each
//! received file here, keyed by record type and attribute, and the
//! attachment manager picks it up on save.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use attachforge_common::paths;
use tracing::debug;

use crate::store::StorageError;

/// Status reported by the upload layer for a received file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadError {
    /// The file arrived intact.
    #[default]
    Ok,
    /// Larger than the server-wide limit.
    ServerSizeLimit,
    /// Larger than the form's limit.
    FormSizeLimit,
    /// Only part of the file arrived.
    Partial,
    /// No file was sent.
    NoFile,
    /// No temporary directory to write to.
    NoTempDir,
    /// Writing the temporary file failed.
    CantWrite,
    /// Rejected by an upload filter.
    Rejected,
}

impl UploadError {
    pub fn is_ok(&self) -> bool {
        *self == UploadError::Ok
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UploadError::Ok => "ok",
            UploadError::ServerSizeLimit => "exceeds server size limit",
            UploadError::FormSizeLimit => "exceeds form size limit",
            UploadError::Partial => "partially uploaded",
            UploadError::NoFile => "no file uploaded",
            UploadError::NoTempDir => "missing temporary directory",
            UploadError::CantWrite => "failed to write to disk",
            UploadError::Rejected => "rejected by upload filter",
        };
        f.write_str(text)
    }
}

/// A received file, still at its temporary location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Name the client sent.
    pub original_name: String,
    /// Where the upload layer wrote the bytes.
    pub temp_path: PathBuf,
    pub error: UploadError,
}

impl UploadedFile {
    pub fn new(original_name: impl Into<String>, temp_path: impl Into<PathBuf>) -> Self {
        Self {
            original_name: original_name.into(),
            temp_path: temp_path.into(),
            error: UploadError::Ok,
        }
    }

    pub fn with_error(mut self, error: UploadError) -> Self {
        self.error = error;
        self
    }

    /// Extension of the original name, empty if it has none.
    pub fn extension(&self) -> &str {
        paths::extension(&self.original_name)
    }
}

/// Source of uploaded files for record attributes.
pub trait UploadSource {
    /// Find the upload for a record type's attribute.
    fn resolve(&self, record_type: &str, attribute: &str) -> Option<UploadedFile>;

    /// Move the upload to its final location.
    fn persist_to(&self, file: &UploadedFile, dest: &Path) -> Result<(), StorageError>;
}

/// Uploads registered by the web layer.
#[derive(Debug, Clone, Default)]
pub struct StagedUploads {
    files: HashMap<(String, String), UploadedFile>,
}

impl StagedUploads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an upload for a record type's attribute.
    pub fn stage(&mut self, record_type: &str, attribute: &str, file: UploadedFile) {
        self.files
            .insert((record_type.to_string(), attribute.to_string()), file);
    }

    /// Forget an upload.
    pub fn clear(&mut self, record_type: &str, attribute: &str) -> Option<UploadedFile> {
        self.files
            .remove(&(record_type.to_string(), attribute.to_string()))
    }
}

impl UploadSource for StagedUploads {
    fn resolve(&self, record_type: &str, attribute: &str) -> Option<UploadedFile> {
        let file = self
            .files
            .get(&(record_type.to_string(), attribute.to_string()))?;

        // Already moved away by an earlier save.
        if file.original_name.is_empty() || !file.temp_path.exists() {
            return None;
        }

        Some(file.clone())
    }

    fn persist_to(&self, file: &UploadedFile, dest: &Path) -> Result<(), StorageError> {
        if !file.error.is_ok() {
            return Err(StorageError::UploadRejected(file.error));
        }

        if fs::rename(&file.temp_path, dest).is_ok() {
            return Ok(());
        }

        // Different filesystem
        debug!(
            "Rename of {:?} failed, copying to {:?} instead",
            file.temp_path, dest
        );
        fs::copy(&file.temp_path, dest)?;
        fs::remove_file(&file.temp_path)?;
        Ok(())
    }
}
