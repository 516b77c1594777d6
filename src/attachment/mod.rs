//! Attachment lifecycle for one record attribute.
//!
//! An [`AttachmentManager`] is built from an
//! [`AttachmentConfig`](crate::config::AttachmentConfig) and hooked into the
//! owning record's save and delete steps. Paths are never cached: every call
//! recomputes them from the record, so the record stays the only source of
//! truth.

mod manager;

pub use manager::AttachmentManager;

use indexmap::IndexMap;
use serde::Serialize;

/// Paths of a stored file and its style variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub base_path: String,
    /// Style name to variant path, in declared style order.
    pub variant_paths: IndexMap<String, String>,
}

impl Attachment {
    /// Base path followed by every variant path.
    pub fn all_paths(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.base_path.as_str())
            .chain(self.variant_paths.values().map(|p| p.as_str()))
    }
}

/// Where a record's attachment is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentState {
    /// No upload and no stored file.
    Empty,
    /// An upload is waiting for the next save.
    Staged,
    /// The stored file exists.
    Persisted,
    /// The attribute names a file that is gone.
    Deleted,
}

/// Files removed by a delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    /// Paths that existed and were removed.
    pub removed: Vec<String>,
}

impl DeleteReport {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}
