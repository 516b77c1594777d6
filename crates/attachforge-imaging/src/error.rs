//! Error types for attachforge-imaging.

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while processing images.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file extension has no codec in this backend.
    #[error("unsupported image format: '{extension}'")]
    UnsupportedFormat { extension: String },

    /// Neither the external tool nor the raster backend is usable.
    #[error("no imaging backend available: install ImageMagick or enable the `raster` feature")]
    NoImagingBackendAvailable,

    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// An external tool failed to execute.
    #[error("tool execution failed: {tool}: {message}")]
    ToolFailed { tool: String, message: String },

    /// Decoding or encoding failed.
    #[cfg(feature = "raster")]
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create an unsupported format error.
    pub fn unsupported_format(extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            extension: extension.into(),
        }
    }

    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a tool execution failed error.
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }
}
