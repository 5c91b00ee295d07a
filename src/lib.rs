//! Rails 5 spec converter: span-safe migration of controller and request specs.
//!
//! This library rewrites `get :show, { id: 1 }` style calls into the keyword
//! argument form Rails 5 expects, wrapped in a version-guarded shim, while
//! copying every byte outside the rewritten calls verbatim.

#![warn(missing_docs)]

pub mod cli;
pub mod context;
pub mod document;
pub mod error;
pub mod options;
pub mod patch;
pub mod rewrite;
pub mod runner;
pub mod syntax;

/// Re-export common error types for convenience.
pub use error::{ConverterError, Result};

/// Re-export the entry points most callers need.
pub use options::{HashSpacing, Options, StyleOptions};
pub use rewrite::{transform, TextTransformer, Transformed};

/// Converter version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
