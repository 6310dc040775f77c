//! Durable, cross-invocation cache.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::manifest::CacheManifest;
use crate::materialize::durable_promote;
use crate::memory::MemoryCache;

/// The persisted cache: a manifest-backed relative-path → entry map plus a
/// directory of real (never linked) output files.
///
/// Loaded when the engine is constructed and mutated only at session
/// teardown, when it absorbs new and changed entries from the in-memory
/// cache. Distinct engine instances must use distinct cache directories
/// (the configured cache identifier namespaces them).
#[derive(Debug)]
pub struct PersistedCache {
    dir: PathBuf,
    entries: BTreeMap<String, CacheEntry>,
}

impl PersistedCache {
    /// Opens the persisted cache rooted at `dir`, creating the directory and
    /// loading any existing manifest.
    ///
    /// A missing manifest means an empty cache. An unreadable or corrupt
    /// manifest is an error.
    pub fn open(dir: &Path) -> Result<Self, CacheError> {
        std::fs::create_dir_all(dir).map_err(|e| CacheError::io(dir, e))?;
        let entries = CacheManifest::load(dir)?
            .map(|m| m.entries)
            .unwrap_or_default();
        log::debug!(
            "opened persisted cache at {} with {} entries",
            dir.display(),
            entries.len()
        );
        Ok(Self {
            dir: dir.to_path_buf(),
            entries,
        })
    }

    /// The cache directory holding the manifest and the output files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Looks up the entry for a source-relative path.
    pub fn get(&self, relative_path: &str) -> Option<&CacheEntry> {
        self.entries.get(relative_path)
    }

    /// Number of persisted paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are persisted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merges new and changed entries from the in-memory cache, copying their
    /// output files out of `scratch_cache_dir` into the persisted directory.
    ///
    /// Hash equality is the authoritative de-duplication rule: an entry whose
    /// hash matches the persisted one is skipped entirely, with no copy and
    /// no content comparison. Must run while the scratch cache still exists.
    /// Returns the number of entries merged.
    pub fn absorb(
        &mut self,
        memory: &MemoryCache,
        scratch_cache_dir: &Path,
    ) -> Result<usize, CacheError> {
        let mut merged = 0;
        for (relative_path, entry) in memory.iter() {
            match self.entries.get(relative_path) {
                Some(existing) if existing.hash == entry.hash => {
                    log::debug!("persist skip (hash unchanged): {relative_path}");
                }
                _ => {
                    durable_promote(scratch_cache_dir, entry, &self.dir)?;
                    self.entries.insert(relative_path.clone(), entry.clone());
                    merged += 1;
                    log::debug!("persisted {relative_path}");
                }
            }
        }
        Ok(merged)
    }

    /// Rewrites the full manifest for the current map.
    pub fn save_manifest(&self) -> Result<(), CacheError> {
        let mut manifest = CacheManifest::new();
        manifest.entries = self.entries.clone();
        manifest.save(&self.dir)
    }
}
