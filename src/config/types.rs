use std::path::PathBuf;

use attachforge_common::SizeSpec;
use attachforge_imaging::{BackendKind, Operation};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub imaging: ImagingConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// Named attachment definitions, in file order.
    #[serde(default)]
    pub attachments: IndexMap<String, AttachmentConfig>,
}

impl Config {
    /// Look up an attachment definition by name.
    pub fn attachment(&self, name: &str) -> Option<&AttachmentConfig> {
        self.attachments.get(name)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImagingConfig {
    /// Backend used for style variants (auto, raster, magick)
    #[serde(default)]
    pub backend: BackendKind,

    /// Custom path to the ImageMagick executable
    #[serde(default)]
    pub magick_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory relative attachment paths are resolved against.
    /// Defaults to the working directory.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

/// How one record attribute stores its file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AttachmentConfig {
    /// Bound to `:folder`
    #[serde(default = "default_folder")]
    pub folder: String,

    /// Path template for the stored file
    #[serde(default = "default_path")]
    pub path: String,

    /// Record attribute holding the stored path
    #[serde(default = "default_attribute")]
    pub attribute: String,

    /// Style name to size spec (`"150x75"`, `"!100x60"`), in declared order
    #[serde(default)]
    pub styles: IndexMap<String, String>,

    /// Operations applied to the stored file before styles are generated
    #[serde(default)]
    pub processors: Vec<ProcessorConfig>,

    /// Returned by lookups when the file is missing
    #[serde(default, alias = "fallback")]
    pub fallback_image: Option<String>,

    /// Fail path rendering on unbound or unresolved tokens
    #[serde(default)]
    pub strict_paths: bool,
}

fn default_folder() -> String {
    "uploads".to_string()
}

fn default_path() -> String {
    ":folder/:id.:ext".to_string()
}

fn default_attribute() -> String {
    "filename".to_string()
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self {
            folder: default_folder(),
            path: default_path(),
            attribute: default_attribute(),
            styles: IndexMap::new(),
            processors: Vec::new(),
            fallback_image: None,
            strict_paths: false,
        }
    }
}

impl AttachmentConfig {
    /// Add a style, builder style.
    pub fn with_style(mut self, name: impl Into<String>, size: impl Into<String>) -> Self {
        self.styles.insert(name.into(), size.into());
        self
    }

    /// Add a processor, builder style.
    pub fn with_processor(mut self, processor: ProcessorConfig) -> Self {
        self.processors.push(processor);
        self
    }
}

/// An operation run in place on a freshly stored file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum ProcessorConfig {
    Resize {
        #[serde(default)]
        backend: BackendKind,
        params: ResizeParams,
    },
    Grayscale {
        #[serde(default)]
        backend: BackendKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,

    #[serde(default = "default_keep_ratio", alias = "keepratio")]
    pub keep_ratio: bool,
}

fn default_keep_ratio() -> bool {
    true
}

impl ProcessorConfig {
    /// Backend requested for this processor.
    pub fn backend(&self) -> BackendKind {
        match self {
            ProcessorConfig::Resize { backend, .. } | ProcessorConfig::Grayscale { backend } => {
                *backend
            }
        }
    }

    /// The image operation this processor performs.
    pub fn operation(&self) -> Operation {
        match self {
            ProcessorConfig::Resize { params, .. } => Operation::Resize(SizeSpec::new(
                params.width,
                params.height,
                params.keep_ratio,
            )),
            ProcessorConfig::Grayscale { .. } => Operation::Grayscale,
        }
    }

    /// Method name as written in config files.
    pub fn name(&self) -> &'static str {
        self.operation().name()
    }
}
