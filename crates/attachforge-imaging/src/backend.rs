//! The resize capability and backend selection.

use std::path::Path;
use std::str::FromStr;

use attachforge_common::SizeSpec;

use crate::calc::Dimensions;
use crate::magick::MagickBackend;
#[cfg(feature = "raster")]
use crate::raster::RasterBackend;
use crate::Result;
#[cfg(not(feature = "raster"))]
use crate::Error;

/// An image operation a backend can apply to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Resize to a style size.
    Resize(SizeSpec),
    /// Convert to a gray colour space.
    Grayscale,
}

impl Operation {
    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Resize(_) => "resize",
            Operation::Grayscale => "grayscale",
        }
    }
}

/// Something that can turn one image file into another.
///
/// `source` and `output` may be the same path, in which case the file is
/// rewritten in place.
pub trait ImageBackend {
    /// Backend name for logs.
    fn name(&self) -> &'static str;

    /// Resize `source` to `spec` and write the result to `output`.
    ///
    /// Returns the dimensions of the written image.
    fn resize(&self, source: &Path, output: &Path, spec: &SizeSpec) -> Result<Dimensions>;

    /// Write a gray colour-space copy of `source` to `output`.
    fn grayscale(&self, source: &Path, output: &Path) -> Result<()>;

    /// Apply an [`Operation`].
    fn apply(&self, operation: &Operation, source: &Path, output: &Path) -> Result<()> {
        match operation {
            Operation::Resize(spec) => self.resize(source, output, spec).map(|_| ()),
            Operation::Grayscale => self.grayscale(source, output),
        }
    }
}

/// Which backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "lowercase"))]
pub enum BackendKind {
    /// The external tool when installed, the raster backend otherwise.
    #[default]
    Auto,
    /// The built-in pixel-buffer backend.
    Raster,
    /// The ImageMagick command-line tool.
    Magick,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Auto => "auto",
            BackendKind::Raster => "raster",
            BackendKind::Magick => "magick",
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(BackendKind::Auto),
            "raster" | "image" => Ok(BackendKind::Raster),
            "magick" | "imagemagick" => Ok(BackendKind::Magick),
            _ => Err(format!("Unknown imaging backend: {}", s)),
        }
    }
}

/// A selected imaging backend.
///
/// Selection probes the system once; keep the value around instead of
/// selecting per operation.
#[derive(Debug, Clone)]
pub enum Backend {
    /// Built-in pixel-buffer backend.
    #[cfg(feature = "raster")]
    Raster(RasterBackend),
    /// ImageMagick command-line backend.
    Magick(MagickBackend),
}

impl Backend {
    /// Select a backend.
    ///
    /// `Auto` prefers ImageMagick when it can be found (at `magick_path` if
    /// given and present, otherwise on `PATH`) and falls back to the raster
    /// backend.
    ///
    /// # Errors
    ///
    /// - [`Error::NoImagingBackendAvailable`] if nothing usable is present.
    /// - [`Error::ToolNotFound`] if `Magick` is requested but not installed.
    pub fn select(kind: BackendKind, magick_path: Option<&Path>) -> Result<Backend> {
        match kind {
            BackendKind::Auto => match MagickBackend::detect(magick_path) {
                Ok(magick) => Ok(Backend::Magick(magick)),
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("ImageMagick unavailable, trying raster backend: {}", _e);
                    Self::raster()
                }
            },
            BackendKind::Raster => Self::raster(),
            BackendKind::Magick => MagickBackend::detect(magick_path).map(Backend::Magick),
        }
    }

    #[cfg(feature = "raster")]
    fn raster() -> Result<Backend> {
        Ok(Backend::Raster(RasterBackend::new()))
    }

    #[cfg(not(feature = "raster"))]
    fn raster() -> Result<Backend> {
        Err(Error::NoImagingBackendAvailable)
    }

    /// The concrete kind of this backend, never `Auto`.
    pub fn kind(&self) -> BackendKind {
        match self {
            #[cfg(feature = "raster")]
            Backend::Raster(_) => BackendKind::Raster,
            Backend::Magick(_) => BackendKind::Magick,
        }
    }

    fn inner(&self) -> &dyn ImageBackend {
        match self {
            #[cfg(feature = "raster")]
            Backend::Raster(raster) => raster,
            Backend::Magick(magick) => magick,
        }
    }
}

impl ImageBackend for Backend {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn resize(&self, source: &Path, output: &Path, spec: &SizeSpec) -> Result<Dimensions> {
        #[cfg(feature = "tracing")]
        tracing::debug!("Resizing {:?} to {} with {}", source, spec, self.name());

        self.inner().resize(source, output, spec)
    }

    fn grayscale(&self, source: &Path, output: &Path) -> Result<()> {
        self.inner().grayscale(source, output)
    }
}

/// Report whether a usable backend exists without building one.
pub fn any_backend_available(magick_path: Option<&Path>) -> bool {
    cfg!(feature = "raster") || MagickBackend::detect(magick_path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_backend_kind_from_str() {
        assert_eq!("auto".parse::<BackendKind>().unwrap(), BackendKind::Auto);
        assert_eq!("Raster".parse::<BackendKind>().unwrap(), BackendKind::Raster);
        assert_eq!(
            "imagemagick".parse::<BackendKind>().unwrap(),
            BackendKind::Magick
        );
        assert!("gd".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_operation_names() {
        let spec = SizeSpec::new(10, 10, true);
        assert_eq!(Operation::Resize(spec).name(), "resize");
        assert_eq!(Operation::Grayscale.name(), "grayscale");
    }

    #[cfg(feature = "raster")]
    #[test]
    fn test_select_raster() {
        let backend = Backend::select(BackendKind::Raster, None).unwrap();
        assert_eq!(backend.kind(), BackendKind::Raster);
        assert_eq!(backend.name(), "raster");
    }

    #[cfg(feature = "raster")]
    #[test]
    fn test_select_auto_always_succeeds_with_raster() {
        let backend = Backend::select(BackendKind::Auto, None).unwrap();
        assert_ne!(backend.kind(), BackendKind::Auto);
        assert!(any_backend_available(None));
    }

    #[test]
    fn test_select_magick_with_bogus_path() {
        // A configured path that does not exist falls back to PATH lookup.
        let result = Backend::select(
            BackendKind::Magick,
            Some(Path::new("/nonexistent/dir/magick")),
        );
        if let Err(err) = result {
            assert!(matches!(err, Error::ToolNotFound { .. }));
        }
    }
}
