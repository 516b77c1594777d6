//! ImageMagick command-line backend.
//!
//! Hands the whole job to ImageMagick's thumbnail operation. The tool
//! computes its own output size, so results are close to, but not always
//! identical with, [`compute`](crate::compute).

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use attachforge_common::SizeSpec;

use crate::backend::ImageBackend;
use crate::calc::Dimensions;
use crate::tools::{self, CONVERT, MAGICK};
use crate::{Error, Result};

/// Backend that shells out to `magick` (or IM6 `convert`).
#[derive(Debug, Clone)]
pub struct MagickBackend {
    program: PathBuf,
}

impl MagickBackend {
    /// Use the given executable.
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }

    /// Find ImageMagick, preferring a configured path, then `magick`, then
    /// `convert` on `PATH`.
    pub fn detect(configured: Option<&Path>) -> Result<Self> {
        tools::get_tool_path(MAGICK, configured)
            .or_else(|_| tools::require_tool(CONVERT))
            .map(Self::new)
    }

    /// Path of the executable in use.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Thumbnail geometry: `WxH` fits within the box, `WxH!` forces it.
    pub fn geometry(spec: &SizeSpec) -> String {
        if spec.keep_ratio {
            format!("{}x{}", spec.width, spec.height)
        } else {
            format!("{}x{}!", spec.width, spec.height)
        }
    }

    fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Run the tool and return its stdout.
    fn run(&self, args: Vec<OsString>) -> Result<String> {
        let tool = self.tool_name();

        #[cfg(feature = "tracing")]
        tracing::debug!("Running {} {:?}", tool, args);

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| Error::tool_failed(&tool, format!("failed to spawn: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::tool_failed(tool, stderr.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Parse the `%wx%h` line printed after a write.
fn parse_dimensions(stdout: &str) -> Option<Dimensions> {
    let (width, height) = stdout.trim().split_once('x')?;
    Some(Dimensions::new(width.parse().ok()?, height.parse().ok()?))
}

impl ImageBackend for MagickBackend {
    fn name(&self) -> &'static str {
        "magick"
    }

    fn resize(&self, source: &Path, output: &Path, spec: &SizeSpec) -> Result<Dimensions> {
        let stdout = self.run(vec![
            source.into(),
            "-thumbnail".into(),
            Self::geometry(spec).into(),
            "-write".into(),
            output.into(),
            "-format".into(),
            "%wx%h".into(),
            "info:".into(),
        ])?;

        parse_dimensions(&stdout).ok_or_else(|| {
            Error::tool_failed(
                self.tool_name(),
                format!("unexpected size output: {:?}", stdout.trim()),
            )
        })
    }

    fn grayscale(&self, source: &Path, output: &Path) -> Result<()> {
        self.run(vec![
            source.into(),
            "-colorspace".into(),
            "Gray".into(),
            output.into(),
        ])
        .map(|_| ())
    }
}
