//! Cache-key computation for entries.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::digest::DigestCache;
use crate::error::CacheError;

/// How per-file identities (and therefore cache keys) are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    /// Identity is path + size + modification time. Near-zero cost, but
    /// defeated by touch-without-modify (spurious re-run) and cannot
    /// recognize a rewrite that produced identical bytes.
    Modification,
    /// Identity is a cryptographic digest of the file's bytes. A full read
    /// per changed file, mitigated by the [`DigestCache`] memo.
    Content,
}

/// Computes cache keys over an entry's input files.
///
/// The key is the ordered, comma-joined concatenation of each input file's
/// identity, so input order is part of the cache identity and a change to
/// any declared input invalidates the entry.
#[derive(Debug)]
pub struct EntryHasher {
    mode: KeyMode,
    digests: DigestCache,
}

impl EntryHasher {
    /// Creates a hasher in the given key mode.
    pub fn new(mode: KeyMode) -> Self {
        Self {
            mode,
            digests: DigestCache::new(),
        }
    }

    /// The key mode this hasher was configured with.
    pub fn mode(&self) -> KeyMode {
        self.mode
    }

    /// Computes the key for an entry whose inputs are `input_files`, resolved
    /// against the source tree rooted at `src_root`.
    pub fn entry_key(&mut self, src_root: &Path, input_files: &[String]) -> Result<String, CacheError> {
        let mut identities = Vec::with_capacity(input_files.len());
        for relative_path in input_files {
            identities.push(self.file_identity(src_root, relative_path)?);
        }
        Ok(identities.join(","))
    }

    fn file_identity(&mut self, src_root: &Path, relative_path: &str) -> Result<String, CacheError> {
        let path = src_root.join(relative_path);
        let meta = std::fs::metadata(&path).map_err(|e| CacheError::io(&path, e))?;
        let mtime = meta.modified().map_err(|e| CacheError::io(&path, e))?;
        match self.mode {
            KeyMode::Modification => {
                // The relative path keeps keys stable across input snapshot
                // directories handed out by the build runtime.
                let nanos = mtime
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_nanos())
                    .unwrap_or(0);
                Ok(format!("{relative_path}|{}|{nanos}", meta.len()))
            }
            KeyMode::Content => Ok(self.digests.digest(&path, mtime)?.to_string()),
        }
    }
}
