//! Attachforge - record file attachments with resized image styles
//!
//! Stores an uploaded file at a path rendered from a template, writes one
//! resized variant per configured style, and removes everything again when
//! the owning record goes away.
//!
//! The record, upload and storage layers are reached through the
//! [`RecordAccess`], [`UploadSource`] and [`FileStore`] traits. Simple
//! implementations of each ([`MemoryRecord`], [`StagedUploads`],
//! [`LocalFileStore`]) are included.

pub mod attachment;
pub mod config;
pub mod error;
pub mod record;
pub mod store;
pub mod upload;

pub use attachment::{Attachment, AttachmentManager, AttachmentState, DeleteReport};
pub use error::{Error, Result};
pub use record::{MemoryRecord, RecordAccess};
pub use store::{FileStore, LocalFileStore, StorageError};
pub use upload::{StagedUploads, UploadError, UploadSource, UploadedFile};
