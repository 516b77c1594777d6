//! Attachforge-Common: path templates, size specs, and path helpers.
//!
//! This crate holds the pure, I/O-free pieces of attachforge:
//!
//! - **Path Templates**: `:token` and `:{dotted.path}` substitution
//! - **Size Specs**: parsing of style strings such as `"150x75"` and `"!100x60"`
//! - **Path Utilities**: extension splitting, variant naming, parent folders
//! - **Error Handling**: common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use attachforge_common::{PathTemplate, SizeSpec, TemplateBindings, Token};
//! use attachforge_common::paths::variant_path;
//! use serde_json::json;
//!
//! let template = PathTemplate::new("uploads/:model/:id.:ext");
//! let bindings = TemplateBindings::new()
//!     .with(Token::Model, "Post")
//!     .with(Token::Id, "5")
//!     .with(Token::Ext, "jpg");
//! let base = template.render(&bindings, &json!({}));
//! assert_eq!(base, "uploads/Post/5.jpg");
//! assert_eq!(variant_path(&base, "thumb"), "uploads/Post/5-thumb.jpg");
//!
//! let spec: SizeSpec = "!100x60".parse().unwrap();
//! assert!(!spec.keep_ratio);
//! ```

pub mod error;
pub mod paths;
pub mod size;
pub mod template;

pub use error::{Error, Result};
pub use size::SizeSpec;
pub use template::{AttributeSource, PathTemplate, TemplateBindings, TemplateError, Token};
