//! Incremental file-transformation filter for build pipelines.
//!
//! Given a directory snapshot, a [`FilterEngine`] applies a per-file
//! [`Transform`] to files with recognized extensions, passes everything else
//! through unchanged, and skips the transform whenever a cached result can be
//! proven current: first against an in-memory cache, then against a persisted
//! cache that survives process restarts.

#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod error;
pub mod transform;

pub use config::{FilterConfig, TextEncoding};
pub use engine::FilterEngine;
pub use error::{ConfigError, EncodingError, FilterError, TransformError};
pub use transform::{Identity, OutputFile, Transform, TransformOutput};
