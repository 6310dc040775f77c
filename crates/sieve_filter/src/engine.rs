//! The build orchestrator.
//!
//! A `FilterEngine` is constructed once per logical transform step and may
//! serve many builds. Each build walks the input snapshot once, routes
//! recognized files through the two-tier cache (in-memory, then persisted)
//! and the transform, and passes everything else through unchanged. Files
//! are processed strictly one at a time in listing order; the first
//! transform failure aborts the remainder of the walk.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use sieve_cache::{
    promote, CacheEntry, EntryHasher, KeyMode, MemoryCache, PersistedCache,
};
use sieve_common::{ensure_dir, link_or_copy, walk_tree};

use crate::config::FilterConfig;
use crate::error::FilterError;
use crate::transform::{OutputFile, Transform, TransformOutput};

/// Incremental file-transformation engine with two-tier caching.
///
/// Lifecycle: [`new`](Self::new) loads the persisted cache,
/// [`run`](Self::run) executes one build against an input snapshot and
/// returns the output directory, [`teardown`](Self::teardown) merges the
/// session's results into the persisted cache and releases the scratch
/// directories. `run` may be called repeatedly between construction and
/// teardown; results cached by earlier runs are reused by later ones.
pub struct FilterEngine<T: Transform> {
    config: FilterConfig,
    transform: T,
    hasher: EntryHasher,
    memory: MemoryCache,
    persisted: PersistedCache,
    scratch: Option<TempDir>,
    last_output: Option<PathBuf>,
    build_counter: u64,
}

impl<T: Transform> FilterEngine<T> {
    /// Creates an engine, validating the configuration and loading the
    /// persisted cache for its cache identifier.
    pub fn new(config: FilterConfig, transform: T) -> Result<Self, FilterError> {
        config.validate()?;
        let persisted = PersistedCache::open(&config.persist_dir())?;
        let mode = if config.cache_by_content {
            KeyMode::Content
        } else {
            KeyMode::Modification
        };
        Ok(Self {
            config,
            transform,
            hasher: EntryHasher::new(mode),
            memory: MemoryCache::new(),
            persisted,
            scratch: None,
            last_output: None,
            build_counter: 0,
        })
    }

    /// The engine's configuration.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// The injected transform.
    pub fn transform(&self) -> &T {
        &self.transform
    }

    /// Prepares the session's scratch directories. Idempotent; `run` calls
    /// this lazily.
    pub fn initialize(&mut self) -> Result<(), FilterError> {
        self.ensure_session().map(|_| ())
    }

    fn ensure_session(&mut self) -> Result<PathBuf, FilterError> {
        if let Some(scratch) = &self.scratch {
            return Ok(scratch.path().to_path_buf());
        }
        let root = tempfile::Builder::new()
            .prefix("sieve-")
            .tempdir()
            .map_err(|e| FilterError::io(std::env::temp_dir(), e))?;
        let path = root.path().to_path_buf();
        let cache_dir = path.join("cache");
        ensure_dir(&cache_dir).map_err(|e| FilterError::io(&cache_dir, e))?;
        self.scratch = Some(root);
        Ok(path)
    }

    /// Executes one full build against the input snapshot at `input_dir`,
    /// returning the directory the output tree was written to.
    ///
    /// The output directory is freshly created per build (the previous
    /// build's output is removed); names carry an engine-owned counter so
    /// builds within a session never collide.
    pub fn run(&mut self, input_dir: &Path) -> Result<PathBuf, FilterError> {
        let session_root = self.ensure_session()?;
        let scratch_cache = session_root.join("cache");

        if let Some(prev) = self.last_output.take() {
            match std::fs::remove_dir_all(&prev) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(FilterError::io(&prev, e)),
            }
        }
        self.build_counter += 1;
        let out_dir = session_root.join(format!("out-{}", self.build_counter));
        ensure_dir(&out_dir).map_err(|e| FilterError::io(&out_dir, e))?;

        let entries = walk_tree(input_dir).map_err(|e| FilterError::io(input_dir, e))?;
        log::debug!(
            "build {}: {} entries under {}",
            self.build_counter,
            entries.len(),
            input_dir.display()
        );

        for walk_entry in &entries {
            let relative_path = walk_entry.relative_path.as_str();
            if walk_entry.is_dir {
                // Mirror the directory layout in both trees.
                for dir in [out_dir.join(relative_path), scratch_cache.join(relative_path)] {
                    ensure_dir(&dir).map_err(|e| FilterError::io(&dir, e))?;
                }
            } else if let Some(dest_path) = self.transform.dest_path(&self.config, relative_path) {
                self.process_and_cache(
                    input_dir,
                    &scratch_cache,
                    &out_dir,
                    relative_path,
                    &dest_path,
                )?;
            } else {
                let src = input_dir.join(relative_path);
                let dst = out_dir.join(relative_path);
                link_or_copy(&src, &dst).map_err(|e| FilterError::io(&src, e))?;
            }
        }

        self.last_output = Some(out_dir.clone());
        Ok(out_dir)
    }

    /// Ends the build session: merges new and changed in-memory entries into
    /// the persisted cache, rewrites its manifest, then releases the scratch
    /// directories.
    ///
    /// The merge runs strictly before the scratch cache is deleted; entries
    /// cached by earlier files of a failed build are still persisted.
    pub fn teardown(&mut self) -> Result<(), FilterError> {
        let Some(scratch) = self.scratch.take() else {
            return Ok(());
        };
        self.last_output = None;
        if !self.memory.is_empty() {
            let scratch_cache = scratch.path().join("cache");
            let merge = self
                .persisted
                .absorb(&self.memory, &scratch_cache)
                .and_then(|merged| self.persisted.save_manifest().map(|()| merged));
            // The scratch files backing these entries go away with the
            // session whether or not the merge succeeded; a retained entry
            // would turn the next run's hit into a dangling promotion.
            self.memory.clear();
            let merged = merge?;
            log::debug!("teardown: merged {merged} entries into the persisted cache");
        }
        let scratch_root = scratch.path().to_path_buf();
        scratch
            .close()
            .map_err(|e| FilterError::io(scratch_root, e))
    }

    fn process_and_cache(
        &mut self,
        src_root: &Path,
        scratch_cache: &Path,
        out_dir: &Path,
        relative_path: &str,
        dest_path: &str,
    ) -> Result<(), FilterError> {
        // In-memory first: within a warm process, validating the stored key
        // is strictly cheaper than touching the persisted directory.
        if let Some(entry) = self.memory.get(relative_path).cloned() {
            if self.entry_valid(src_root, &entry)? {
                log::debug!("cache hit (memory): {relative_path}");
                promote(scratch_cache, &entry, out_dir)?;
                return Ok(());
            }
        }
        if let Some(entry) = self.persisted.get(relative_path).cloned() {
            if self.entry_valid(src_root, &entry)? {
                log::debug!("cache hit (persisted): {relative_path}");
                promote(self.persisted.dir(), &entry, scratch_cache)?;
                promote(scratch_cache, &entry, out_dir)?;
                self.memory.insert(relative_path.to_string(), entry);
                return Ok(());
            }
        }
        log::debug!("cache miss: {relative_path}");
        self.run_transform(src_root, scratch_cache, out_dir, relative_path, dest_path)
    }

    /// Returns whether `entry` still matches the current source tree, i.e.
    /// recomputing its key yields exactly the stored hash. A missing input
    /// file invalidates the entry rather than failing the build.
    fn entry_valid(&mut self, src_root: &Path, entry: &CacheEntry) -> Result<bool, FilterError> {
        match self
            .transform
            .entry_key(&mut self.hasher, src_root, &entry.input_files)
        {
            Ok(key) => Ok(key == entry.hash),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn run_transform(
        &mut self,
        src_root: &Path,
        scratch_cache: &Path,
        out_dir: &Path,
        relative_path: &str,
        dest_path: &str,
    ) -> Result<(), FilterError> {
        let abs = src_root.join(relative_path);
        let bytes = std::fs::read(&abs).map_err(|e| FilterError::io(&abs, e))?;
        let content = self
            .config
            .input_encoding
            .decode(&bytes)
            .map_err(|source| FilterError::Encoding {
                path: abs.clone(),
                source,
            })?;

        let output = self
            .transform
            .process(&content, relative_path)
            .map_err(|source| FilterError::Transform {
                path: abs.clone(),
                source,
            })?;

        let (input_files, outputs) = match output {
            TransformOutput::Single(content) => (
                vec![relative_path.to_string()],
                vec![OutputFile {
                    path: dest_path.to_string(),
                    content,
                }],
            ),
            TransformOutput::Multi {
                input_files,
                output_files,
            } => (
                input_files.unwrap_or_else(|| vec![relative_path.to_string()]),
                output_files,
            ),
        };

        for file in &outputs {
            let path = scratch_cache.join(&file.path);
            if let Some(parent) = path.parent() {
                ensure_dir(parent).map_err(|e| FilterError::io(parent, e))?;
            }
            // A prior promotion may have hard-linked this scratch path to a
            // persisted file; break the link before rewriting.
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(FilterError::io(&path, e)),
            }
            let encoded = self
                .config
                .output_encoding
                .encode(&file.content)
                .map_err(|source| FilterError::Encoding {
                    path: path.clone(),
                    source,
                })?;
            std::fs::write(&path, encoded).map_err(|e| FilterError::io(&path, e))?;
        }

        let hash = self
            .transform
            .entry_key(&mut self.hasher, src_root, &input_files)?;
        let entry = CacheEntry {
            input_files,
            output_files: outputs.iter().map(|f| f.path.clone()).collect(),
            hash,
        };
        promote(scratch_cache, &entry, out_dir)?;
        self.memory.insert(relative_path.to_string(), entry);
        Ok(())
    }
}
