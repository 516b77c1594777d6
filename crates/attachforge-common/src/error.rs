//! Common error types used throughout attachforge.

use crate::template::TemplateError;

/// Common error type for attachforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A style size string could not be parsed.
    #[error("invalid size spec '{spec}': {reason}")]
    InvalidSizeSpec { spec: String, reason: String },

    /// A strict-mode path template could not be fully resolved.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl Error {
    /// Create a new InvalidSizeSpec error.
    pub fn invalid_size_spec<S: Into<String>, R: Into<String>>(spec: S, reason: R) -> Self {
        Self::InvalidSizeSpec {
            spec: spec.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
