//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], a temporary storage root with helpers for
//! writing images, staging uploads and building managers on the raster
//! backend.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use attachforge::config::AttachmentConfig;
use attachforge::{AttachmentManager, LocalFileStore, StagedUploads, UploadedFile};
use attachforge_imaging::{Backend, RasterBackend};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;

static UPLOAD_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A temporary storage root.
pub struct TestHarness {
    pub dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    /// Storage root that relative attachment paths resolve against.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute location of a stored path.
    pub fn stored(&self, path: &str) -> PathBuf {
        self.root().join(path)
    }

    /// Manager storing under the harness root, resizing with the raster backend.
    pub fn manager(&self, config: AttachmentConfig) -> AttachmentManager {
        AttachmentManager::with_backend(
            config,
            LocalFileStore::with_root(self.root()),
            StagedUploads::new(),
            Backend::Raster(RasterBackend::new()),
        )
    }

    /// Write a solid red image in the format matching `name`'s extension and
    /// return it as an upload named `name`.
    pub fn upload_image(&self, name: &str, width: u32, height: u32) -> UploadedFile {
        let temp = self.temp_upload_path();
        let format = Path::new(name)
            .extension()
            .and_then(ImageFormat::from_extension)
            .expect("test image needs a known extension");

        let mut img = RgbImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = Rgb([200, 30, 30]);
        }
        DynamicImage::ImageRgb8(img)
            .save_with_format(&temp, format)
            .expect("failed to write test image");

        UploadedFile::new(name, temp)
    }

    /// Write raw bytes and return them as an upload named `name`.
    pub fn upload_bytes(&self, name: &str, bytes: &[u8]) -> UploadedFile {
        let temp = self.temp_upload_path();
        std::fs::write(&temp, bytes).expect("failed to write upload");
        UploadedFile::new(name, temp)
    }

    /// Create a file at a stored path.
    pub fn touch(&self, path: &str) {
        let full = self.stored(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, b"old").unwrap();
    }

    /// Regular files below `dir`, relative to the root, sorted.
    pub fn files_under(&self, dir: &str) -> Vec<String> {
        let mut files = Vec::new();
        collect_files(self.root(), &self.stored(dir), &mut files);
        files.sort();
        files
    }

    fn temp_upload_path(&self) -> PathBuf {
        let n = UPLOAD_COUNTER.fetch_add(1, Ordering::Relaxed);
        let incoming = self.root().join("incoming");
        std::fs::create_dir_all(&incoming).unwrap();
        incoming.join(format!("upload-{n}.tmp"))
    }
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, &path, out);
        } else {
            let relative = path.strip_prefix(root).unwrap();
            out.push(relative.to_string_lossy().replace('\\', "/"));
        }
    }
}
