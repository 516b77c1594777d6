use std::path::Path;

use attachforge_common::paths::{self, variant_path};
use attachforge_common::{PathTemplate, SizeSpec, TemplateBindings, Token};
use attachforge_imaging::{Backend, BackendKind, ImageBackend, Operation};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{Attachment, AttachmentState, DeleteReport};
use crate::config::{AttachmentConfig, ImagingConfig};
use crate::error::{Error, Result};
use crate::record::{attribute_text, RecordAccess, RecordRoot};
use crate::store::{FileStore, LocalFileStore};
use crate::upload::{StagedUploads, UploadSource, UploadedFile};

/// Companion attributes written on save when the record declares them.
const FILE_SIZE: &str = "file_size";
const FILE_TYPE: &str = "file_type";
const EXTENSION: &str = "extension";

/// Stores, resizes, looks up and deletes the file behind one record
/// attribute.
///
/// Call [`after_save`](Self::after_save) once the owning record has been
/// saved and [`after_delete`](Self::after_delete) once it has been deleted.
/// Both run synchronously inside the caller's save or delete step.
///
/// # Concurrency
///
/// There is no locking. Two saves racing on the same record attribute are
/// the caller's problem: supersession deletes the old file before the new
/// one is written, so a reader in between can see no file at all. Directory
/// creation is idempotent and safe to race on.
///
/// # Example
///
/// ```no_run
/// use attachforge::config::AttachmentConfig;
/// use attachforge::{AttachmentManager, LocalFileStore, MemoryRecord, StagedUploads, UploadedFile};
/// use attachforge_imaging::{Backend, BackendKind};
/// use serde_json::json;
///
/// let config = AttachmentConfig::default().with_style("thumb", "100x60");
/// let backend = Backend::select(BackendKind::Auto, None)?;
/// let mut manager =
///     AttachmentManager::with_backend(config, LocalFileStore::new(), StagedUploads::new(), backend);
///
/// manager
///     .uploads_mut()
///     .stage("Post", "filename", UploadedFile::new("cat.jpg", "/tmp/upload-1"));
///
/// let mut post = MemoryRecord::new("Post", json!(5)).with_field("filename", json!(null));
/// manager.after_save(&mut post)?;
/// assert_eq!(manager.get_attachment(&post, Some("thumb")), "uploads/5-thumb.jpg");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct AttachmentManager<S = LocalFileStore, U = StagedUploads> {
    config: AttachmentConfig,
    template: PathTemplate,
    variant_template: PathTemplate,
    /// Backend for style variants, `None` when no styles are declared.
    backend: Option<Backend>,
    processors: Vec<(Operation, Backend)>,
    store: S,
    uploads: U,
}

impl<S: FileStore, U: UploadSource> AttachmentManager<S, U> {
    /// Build a manager, selecting imaging backends from `imaging`.
    ///
    /// Processors that ask for the `auto` backend get the configured one.
    /// Selection happens here, once, and never again for this manager.
    pub fn new(
        config: AttachmentConfig,
        store: S,
        uploads: U,
        imaging: &ImagingConfig,
    ) -> Result<Self> {
        let magick_path = imaging.magick_path.as_deref();

        let backend = if config.styles.is_empty() {
            None
        } else {
            Some(Backend::select(imaging.backend, magick_path)?)
        };

        let mut processors = Vec::with_capacity(config.processors.len());
        for processor in &config.processors {
            let kind = match processor.backend() {
                BackendKind::Auto => imaging.backend,
                kind => kind,
            };
            processors.push((processor.operation(), Backend::select(kind, magick_path)?));
        }

        if let Some(backend) = &backend {
            debug!(backend = backend.name(), "Selected imaging backend for styles");
        }

        Ok(Self::assemble(config, store, uploads, backend, processors))
    }

    /// Build a manager that uses `backend` for styles and every processor.
    pub fn with_backend(config: AttachmentConfig, store: S, uploads: U, backend: Backend) -> Self {
        let processors = config
            .processors
            .iter()
            .map(|processor| (processor.operation(), backend.clone()))
            .collect();
        Self::assemble(config, store, uploads, Some(backend), processors)
    }

    fn assemble(
        config: AttachmentConfig,
        store: S,
        uploads: U,
        backend: Option<Backend>,
        processors: Vec<(Operation, Backend)>,
    ) -> Self {
        let template = PathTemplate::new(config.path.as_str());
        let variant_template = template.variant_pattern();
        Self {
            config,
            template,
            variant_template,
            backend,
            processors,
            store,
            uploads,
        }
    }

    pub fn config(&self) -> &AttachmentConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn uploads(&self) -> &U {
        &self.uploads
    }

    /// Access to the upload source, for staging files.
    pub fn uploads_mut(&mut self) -> &mut U {
        &mut self.uploads
    }

    /// Store the record's pending upload and generate its styles.
    ///
    /// Returns `Ok(None)` when there is no usable upload for the attribute.
    /// The first failing style aborts the rest with [`Error::ResizeFailed`].
    pub fn after_save(&self, record: &mut dyn RecordAccess) -> Result<Option<Attachment>> {
        let file = match self.resolve_upload(record) {
            Ok(file) => file,
            Err(Error::UploadUnavailable { attribute }) => {
                debug!(attribute = %attribute, "No upload to store");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let extension = file.extension().to_string();

        let mut bindings = self.bindings(record, &extension);
        bindings.set(Token::Filename, file.original_name.as_str());

        // Nothing is removed until the new path has rendered.
        let base_path = self.render(&self.template, &bindings, record)?;

        let was_new = record.is_new_record();
        if !was_new {
            let current = attribute_text(record, &self.config.attribute);
            if !current.is_empty() && self.store.exists(&current) {
                info!(path = %current, "Superseding stored file");
                self.remove_files(&current)?;
            }
        }

        let folder = paths::parent_folder(&base_path);
        self.store
            .ensure_dir(folder)
            .map_err(|e| Error::storage("create directory", folder, e))?;

        let stored = self.store.resolve(&base_path);
        self.uploads
            .persist_to(&file, &stored)
            .map_err(|e| Error::storage("store upload at", base_path.as_str(), e))?;
        debug!(from = ?file.temp_path, to = %base_path, "Upload stored");

        record.set_attribute(&self.config.attribute, Value::String(base_path.clone()));
        if was_new {
            record.mark_saved();
        }
        self.write_companions(record, &base_path, &extension)?;

        for (operation, backend) in &self.processors {
            debug!(method = operation.name(), backend = backend.name(), "Running processor");
            backend
                .apply(operation, &stored, &stored)
                .map_err(|source| Error::ProcessorFailed {
                    method: operation.name(),
                    source,
                })?;
        }

        let mut variant_paths = IndexMap::with_capacity(self.config.styles.len());
        for (style, size) in &self.config.styles {
            bindings.set(Token::Custom, style.as_str());
            let output = self.render(&self.variant_template, &bindings, record)?;
            self.generate_style(style, size, &stored, &output)?;
            variant_paths.insert(style.clone(), output);
        }

        info!(
            path = %base_path,
            styles = variant_paths.len(),
            "Attachment saved"
        );

        Ok(Some(Attachment {
            base_path,
            variant_paths,
        }))
    }

    /// Remove the stored file and every style variant of a deleted record.
    pub fn after_delete(&self, record: &dyn RecordAccess) -> Result<DeleteReport> {
        let base_path = attribute_text(record, &self.config.attribute);
        if base_path.is_empty() {
            return Ok(DeleteReport::default());
        }

        let report = self.remove_files(&base_path)?;
        info!(path = %base_path, removed = report.removed.len(), "Attachment deleted");
        Ok(report)
    }

    /// Remove the files and clear the record's attribute.
    pub fn delete_attachment(&self, record: &mut dyn RecordAccess) -> Result<DeleteReport> {
        let report = self.after_delete(record)?;
        record.set_attribute(&self.config.attribute, Value::Null);
        Ok(report)
    }

    /// Path to show for the record, or for one of its styles.
    ///
    /// Falls back to the configured fallback image when the file is missing.
    /// An empty string means there is nothing to show, as does asking for a
    /// style that is not configured.
    pub fn get_attachment(&self, record: &dyn RecordAccess, style: Option<&str>) -> String {
        let base_path = attribute_text(record, &self.config.attribute);

        let candidate = match style {
            None => base_path,
            Some(style) if self.config.styles.contains_key(style) => {
                if base_path.is_empty() {
                    String::new()
                } else {
                    variant_path(&base_path, style)
                }
            }
            Some(style) => {
                debug!(style, "Unknown style requested");
                return String::new();
            }
        };

        if !candidate.is_empty() && self.store.exists(&candidate) {
            return candidate;
        }

        self.config.fallback_image.clone().unwrap_or_default()
    }

    /// Whether the record's stored file exists.
    pub fn has_attachment(&self, record: &dyn RecordAccess) -> bool {
        let base_path = attribute_text(record, &self.config.attribute);
        self.store.exists(&base_path)
    }

    /// Render the path template for the record as it is now.
    ///
    /// `:ext` comes from the attribute's current value and `:custom` from
    /// `custom`. `:filename` is only known during a save and stays unbound.
    pub fn get_parsed_path(&self, record: &dyn RecordAccess, custom: Option<&str>) -> Result<String> {
        let current = attribute_text(record, &self.config.attribute);
        let mut bindings = self.bindings(record, paths::extension(&current));
        if let Some(custom) = custom {
            bindings.set(Token::Custom, custom);
        }
        self.render(&self.template, &bindings, record)
    }

    /// Current paths of the record's attachment, if one is stored.
    pub fn attachment(&self, record: &dyn RecordAccess) -> Option<Attachment> {
        let base_path = attribute_text(record, &self.config.attribute);
        if base_path.is_empty() {
            return None;
        }

        let variant_paths = self
            .config
            .styles
            .keys()
            .map(|style| (style.clone(), variant_path(&base_path, style)))
            .collect();

        Some(Attachment {
            base_path,
            variant_paths,
        })
    }

    /// Lifecycle state of the record's attachment.
    pub fn state(&self, record: &dyn RecordAccess) -> AttachmentState {
        if self.resolve_upload(record).is_ok() {
            return AttachmentState::Staged;
        }

        let base_path = attribute_text(record, &self.config.attribute);
        if base_path.is_empty() {
            AttachmentState::Empty
        } else if self.store.exists(&base_path) {
            AttachmentState::Persisted
        } else {
            AttachmentState::Deleted
        }
    }

    fn resolve_upload(&self, record: &dyn RecordAccess) -> Result<UploadedFile> {
        let unavailable = || Error::UploadUnavailable {
            attribute: self.config.attribute.clone(),
        };

        let file = self
            .uploads
            .resolve(record.type_name(), &self.config.attribute)
            .ok_or_else(unavailable)?;

        if !file.error.is_ok() {
            warn!(
                attribute = %self.config.attribute,
                error = %file.error,
                "Ignoring failed upload"
            );
            return Err(unavailable());
        }

        Ok(file)
    }

    fn bindings(&self, record: &dyn RecordAccess, extension: &str) -> TemplateBindings {
        let mut bindings = TemplateBindings::new()
            .with(Token::Folder, self.config.folder.as_str())
            .with(Token::Model, record.type_name())
            .with(Token::Ext, extension);

        if let Some(id) = record
            .primary_key()
            .as_ref()
            .and_then(attachforge_common::template::scalar_text)
        {
            bindings.set(Token::Id, id);
        }

        bindings
    }

    fn render(
        &self,
        template: &PathTemplate,
        bindings: &TemplateBindings,
        record: &dyn RecordAccess,
    ) -> Result<String> {
        let root = RecordRoot(record);
        if self.config.strict_paths {
            Ok(template.render_strict(bindings, &root)?)
        } else {
            Ok(template.render(bindings, &root))
        }
    }

    fn write_companions(
        &self,
        record: &mut dyn RecordAccess,
        base_path: &str,
        extension: &str,
    ) -> Result<()> {
        if record.has_field(FILE_SIZE) {
            let size = self
                .store
                .size(base_path)
                .map_err(|e| Error::storage("read size of", base_path, e))?;
            record.set_attribute(FILE_SIZE, Value::from(size));
        }

        if record.has_field(FILE_TYPE) {
            let mime = self
                .store
                .mime_type(base_path)
                .map_err(|e| Error::storage("read type of", base_path, e))?;
            record.set_attribute(FILE_TYPE, Value::String(mime));
        }

        if record.has_field(EXTENSION) {
            record.set_attribute(EXTENSION, Value::String(extension.to_string()));
        }

        Ok(())
    }

    fn generate_style(&self, style: &str, size: &str, source: &Path, output: &str) -> Result<()> {
        let resize_failed = |source: attachforge_imaging::Error| Error::ResizeFailed {
            style: style.to_string(),
            source,
        };

        let spec: SizeSpec = size
            .parse()
            .map_err(|e: attachforge_common::Error| {
                resize_failed(attachforge_imaging::Error::InvalidInput(e.to_string()))
            })?;

        let backend = self
            .backend
            .as_ref()
            .ok_or(Error::NoImagingBackendAvailable)?;

        let written = backend
            .resize(source, &self.store.resolve(output), &spec)
            .map_err(resize_failed)?;

        debug!(style, path = %output, size = %written, "Style generated");
        Ok(())
    }

    /// Remove a base file and the variant of every declared style.
    ///
    /// Every removal is attempted; the first failure is returned.
    fn remove_files(&self, base_path: &str) -> Result<DeleteReport> {
        let mut report = DeleteReport::default();
        let mut first_error = None;

        let paths = std::iter::once(base_path.to_string()).chain(
            self.config
                .styles
                .keys()
                .map(|style| variant_path(base_path, style)),
        );

        for path in paths {
            let existed = self.store.exists(&path);
            match self.store.remove(&path) {
                Ok(()) if existed => report.removed.push(path),
                Ok(()) => {}
                Err(e) => {
                    warn!(path = %path, error = %e, "Failed to remove file");
                    first_error.get_or_insert(Error::storage("remove", path, e));
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(report),
        }
    }
}
