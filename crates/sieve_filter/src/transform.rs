//! The transform capability interface.

use std::path::Path;

use sieve_cache::{CacheError, EntryHasher};

use crate::config::FilterConfig;
use crate::error::TransformError;

/// One file produced by a transform, addressed relative to the destination
/// tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    /// Destination-relative path.
    pub path: String,
    /// Text content, encoded with the configured output encoding on write.
    pub content: String,
}

/// The result of transforming one file.
#[derive(Debug, Clone)]
pub enum TransformOutput {
    /// The common case: one transformed string, written to the destination
    /// path derived from the extension-rewrite rule.
    Single(String),

    /// A structured result naming its own inputs and outputs, for
    /// one-to-many or many-to-one transforms.
    Multi {
        /// Source-relative inputs the cache key must cover. `None` means
        /// just the file being processed.
        input_files: Option<Vec<String>>,
        /// Every file the transform produced.
        output_files: Vec<OutputFile>,
    },
}

/// A per-file transform plus its overridable routing and hashing hooks.
///
/// Implementors supply [`process`](Transform::process); the other methods
/// have defaults driven by the engine's configuration and entry hasher, and
/// exist as override points: a custom destination rule can declare files
/// unprocessable, and a custom entry key changes what counts as "unchanged".
pub trait Transform {
    /// Transforms one file's decoded content.
    ///
    /// Must not write to the output directory itself; the engine writes the
    /// returned content into its scratch cache and promotes it from there.
    fn process(
        &self,
        content: &str,
        relative_path: &str,
    ) -> Result<TransformOutput, TransformError>;

    /// Maps a source-relative path to its destination-relative path.
    /// Returning `None` marks the file as not processable, and it is passed
    /// through unchanged.
    fn dest_path(&self, config: &FilterConfig, relative_path: &str) -> Option<String> {
        config.dest_path(relative_path)
    }

    /// Computes the cache key over an entry's input files.
    fn entry_key(
        &self,
        hasher: &mut EntryHasher,
        src_root: &Path,
        input_files: &[String],
    ) -> Result<String, CacheError> {
        hasher.entry_key(src_root, input_files)
    }
}

/// The identity transform: output equals input. Combined with caching this
/// gives an incremental copy step, and it is the reference transform for the
/// engine's tests and the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Transform for Identity {
    fn process(
        &self,
        content: &str,
        _relative_path: &str,
    ) -> Result<TransformOutput, TransformError> {
        Ok(TransformOutput::Single(content.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_cache::KeyMode;

    #[test]
    fn identity_returns_input() {
        let out = Identity.process("payload", "a.txt").unwrap();
        match out {
            TransformOutput::Single(s) => assert_eq!(s, "payload"),
            TransformOutput::Multi { .. } => panic!("identity must be single-output"),
        }
    }

    #[test]
    fn default_dest_path_uses_config_rule() {
        let config = FilterConfig::new("c", &["txt"]).with_target_extension("md");
        assert_eq!(Identity.dest_path(&config, "a.txt").as_deref(), Some("a.md"));
        assert_eq!(Identity.dest_path(&config, "a.rs"), None);
    }

    #[test]
    fn default_entry_key_delegates_to_hasher() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"x").unwrap();

        let mut hasher = EntryHasher::new(KeyMode::Content);
        let inputs = vec!["a.txt".to_string()];
        let via_trait = Identity.entry_key(&mut hasher, dir.path(), &inputs).unwrap();
        let direct = hasher.entry_key(dir.path(), &inputs).unwrap();
        assert_eq!(via_trait, direct);
    }
}
