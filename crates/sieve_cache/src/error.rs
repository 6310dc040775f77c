//! Error types for cache operations.

use std::path::{Path, PathBuf};

/// Errors that can occur during cache operations.
///
/// A missing manifest is not an error (it means "no persisted cache yet"
/// and is handled inside [`crate::manifest`]); everything here is a real
/// failure that callers must surface.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The cache manifest could not be parsed as valid JSON.
    #[error("failed to parse cache manifest: {reason}")]
    ManifestParse {
        /// Description of the parse failure.
        reason: String,
    },

    /// A serialization error occurred while writing the manifest.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}

impl CacheError {
    /// Wraps an I/O error with the path it occurred at.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns `true` if this is a not-found I/O error.
    ///
    /// A cache entry whose input file has disappeared cannot validate; lookups
    /// treat that as a miss rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = CacheError::io(
            Path::new("/tmp/cache/manifest.json"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        );
        let msg = err.to_string();
        assert!(msg.contains("cache I/O error"));
        assert!(msg.contains("manifest.json"));
    }

    #[test]
    fn manifest_parse_display() {
        let err = CacheError::ManifestParse {
            reason: "unexpected EOF".to_string(),
        };
        assert!(err.to_string().contains("unexpected EOF"));
    }

    #[test]
    fn serialization_display() {
        let err = CacheError::Serialization {
            reason: "key must be a string".to_string(),
        };
        assert!(err.to_string().contains("key must be a string"));
    }

    #[test]
    fn not_found_detection() {
        let not_found = CacheError::io(
            Path::new("gone.txt"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(not_found.is_not_found());

        let denied = CacheError::io(
            Path::new("locked.txt"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!denied.is_not_found());

        let parse = CacheError::ManifestParse {
            reason: "bad".to_string(),
        };
        assert!(!parse.is_not_found());
    }
}
