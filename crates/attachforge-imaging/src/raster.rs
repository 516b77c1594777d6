//! Pixel-buffer backend built on the `image` crate.
//!
//! Decodes JPEG, PNG, and GIF, scales with a bilinear filter to the size
//! from [`compute`](crate::compute), and writes with the codec of the
//! source file. Formats are never converted.

use std::path::Path;

use attachforge_common::SizeSpec;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};

use crate::backend::ImageBackend;
use crate::calc::{compute, Dimensions};
use crate::{Error, Result};

/// Formats the raster backend can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Jpeg,
    Png,
    Gif,
}

impl RasterFormat {
    /// Match a file extension, ignoring case.
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(RasterFormat::Jpeg),
            "png" => Ok(RasterFormat::Png),
            "gif" => Ok(RasterFormat::Gif),
            _ => Err(Error::unsupported_format(extension)),
        }
    }

    /// Match the extension of a path.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::from_extension(extension)
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            RasterFormat::Jpeg => ImageFormat::Jpeg,
            RasterFormat::Png => ImageFormat::Png,
            RasterFormat::Gif => ImageFormat::Gif,
        }
    }
}

/// The self-contained raster backend.
#[derive(Debug, Clone)]
pub struct RasterBackend {
    filter: FilterType,
}

impl RasterBackend {
    pub fn new() -> Self {
        Self {
            filter: FilterType::Triangle,
        }
    }

    /// Decode an image, choosing the codec from the file extension.
    pub fn decode(&self, path: &Path) -> Result<(DynamicImage, RasterFormat)> {
        let format = RasterFormat::from_path(path)?;
        let mut reader = ImageReader::open(path)?;
        reader.set_format(format.image_format());
        let image = reader.decode()?;
        Ok((image, format))
    }

    /// Scale to exactly `size`. Zero axes are raised to one pixel.
    pub fn scale(&self, image: &DynamicImage, size: Dimensions) -> DynamicImage {
        image.resize_exact(size.width.max(1), size.height.max(1), self.filter)
    }

    /// Encode `image` to `path` as `format`.
    pub fn encode(&self, image: &DynamicImage, path: &Path, format: RasterFormat) -> Result<()> {
        match format {
            // JPEG has no alpha channel
            RasterFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8())
                .save_with_format(path, ImageFormat::Jpeg)?,
            RasterFormat::Gif => DynamicImage::ImageRgba8(image.to_rgba8())
                .save_with_format(path, ImageFormat::Gif)?,
            RasterFormat::Png => image.save_with_format(path, ImageFormat::Png)?,
        }
        Ok(())
    }
}

impl Default for RasterBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RasterBackend {
    fn name(&self) -> &'static str {
        "raster"
    }

    fn resize(&self, source: &Path, output: &Path, spec: &SizeSpec) -> Result<Dimensions> {
        let (image, format) = self.decode(source)?;
        let original = Dimensions::new(image.width(), image.height());
        let target = compute(
            original,
            Dimensions::new(spec.width, spec.height),
            spec.keep_ratio,
        );

        let scaled = self.scale(&image, target);
        self.encode(&scaled, output, format)?;

        Ok(Dimensions::new(scaled.width(), scaled.height()))
    }

    fn grayscale(&self, source: &Path, output: &Path) -> Result<()> {
        let (image, format) = self.decode(source)?;
        self.encode(&image.grayscale(), output, format)
    }
}
