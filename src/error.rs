//! Error types for attachment operations.

use attachforge_common::TemplateError;

use crate::store::StorageError;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by [`AttachmentManager`](crate::AttachmentManager).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No imaging backend could be selected.
    #[error("no imaging backend available: install ImageMagick or enable the `raster` feature")]
    NoImagingBackendAvailable,

    /// Generating a style variant failed. Remaining styles were skipped.
    #[error("style '{style}' failed: {source}")]
    ResizeFailed {
        style: String,
        #[source]
        source: attachforge_imaging::Error,
    },

    /// A configured processor failed on the stored file.
    #[error("processor '{method}' failed: {source}")]
    ProcessorFailed {
        method: &'static str,
        #[source]
        source: attachforge_imaging::Error,
    },

    /// No usable upload exists for the attribute.
    #[error("no upload available for attribute '{attribute}'")]
    UploadUnavailable { attribute: String },

    /// A file store or upload operation failed.
    #[error("failed to {operation} '{path}': {source}")]
    StorageFailure {
        operation: &'static str,
        path: String,
        #[source]
        source: StorageError,
    },

    /// A strict-mode path template could not be resolved.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Any other imaging error, such as a missing ImageMagick install.
    #[error("imaging error: {0}")]
    Imaging(attachforge_imaging::Error),
}

impl Error {
    /// Create a storage failure error.
    pub fn storage(operation: &'static str, path: impl Into<String>, source: StorageError) -> Self {
        Self::StorageFailure {
            operation,
            path: path.into(),
            source,
        }
    }
}

impl From<attachforge_imaging::Error> for Error {
    fn from(err: attachforge_imaging::Error) -> Self {
        match err {
            attachforge_imaging::Error::NoImagingBackendAvailable => {
                Error::NoImagingBackendAvailable
            }
            other => Error::Imaging(other),
        }
    }
}
