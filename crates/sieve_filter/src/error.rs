//! Error types for configuration and filter runs.

use std::path::PathBuf;

use sieve_cache::CacheError;

/// Errors raised when loading or validating a filter configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required field is missing from the configuration.
    #[error("missing required field: {0}")]
    MissingField(String),
}

/// A failure converting between raw file bytes and text.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    /// The input bytes are not valid UTF-8.
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// The output contains a character the target encoding cannot express.
    #[error("character {0:?} is not representable in Latin-1")]
    Unrepresentable(char),
}

/// A failure reported by the external transform for one file.
///
/// Carries optional line/column information when the transform can attribute
/// the failure to a location in the source; the engine preserves it when
/// wrapping the error with the source path.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct TransformError {
    /// Human-readable description of the failure.
    pub message: String,
    /// One-based source line, when known.
    pub line: Option<u32>,
    /// One-based source column, when known.
    pub column: Option<u32>,
}

impl TransformError {
    /// Creates a transform error with no location information.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Attaches a source location to the error.
    pub fn with_location(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

/// Errors surfaced to the build-graph runtime by a filter engine.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// The engine was constructed with an invalid configuration. Fatal.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The external transform failed for one file. Aborts the current build;
    /// no cache entry or output is produced for that file.
    #[error("transform failed for {path}: {source}")]
    Transform {
        /// Absolute path of the offending source file.
        path: PathBuf,
        /// The transform's own error, location preserved.
        source: TransformError,
    },

    /// A filesystem operation failed outside the cache layer.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A file's bytes could not be decoded, or its output could not be
    /// encoded, with the configured text encoding.
    #[error("encoding error for {path}: {source}")]
    Encoding {
        /// The file being decoded or encoded.
        path: PathBuf,
        /// The underlying conversion failure.
        source: EncodingError,
    },

    /// A cache-layer failure (manifest, digesting, materialization).
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl FilterError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
