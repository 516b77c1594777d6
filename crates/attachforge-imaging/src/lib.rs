//! # attachforge-imaging
//!
//! Image resizing backends for attachment styles.
//!
//! This crate provides:
//! - The area-matching size computation shared by all backends ([`compute`])
//! - A self-contained raster backend on top of the `image` crate
//! - An ImageMagick backend that shells out to `magick`/`convert`
//! - Capability-probing backend selection ([`Backend::select`])
//!
//! ## Features
//!
//! - `raster` (default) - Built-in JPEG/PNG/GIF backend
//! - `serialize` - Serde support for [`BackendKind`]
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use attachforge_common::SizeSpec;
//! use attachforge_imaging::{Backend, BackendKind, ImageBackend};
//! use std::path::Path;
//!
//! let backend = Backend::select(BackendKind::Auto, None)?;
//! let spec: SizeSpec = "!100x60".parse().unwrap();
//! let size = backend.resize(
//!     Path::new("uploads/Post/5.jpg"),
//!     Path::new("uploads/Post/5-thumb.jpg"),
//!     &spec,
//! )?;
//! println!("wrote {size}");
//! # Ok::<(), attachforge_imaging::Error>(())
//! ```

pub mod backend;
pub mod calc;
mod error;
pub mod magick;
#[cfg(feature = "raster")]
pub mod raster;
pub mod tools;

// Re-exports
pub use backend::{any_backend_available, Backend, BackendKind, ImageBackend, Operation};
pub use calc::{compute, Dimensions};
pub use error::{Error, Result};
pub use magick::MagickBackend;
#[cfg(feature = "raster")]
pub use raster::{RasterBackend, RasterFormat};
pub use tools::{check_tool, check_tools, require_tool, ToolInfo};
