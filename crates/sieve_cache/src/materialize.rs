//! Turning cache entries into output files.

use std::path::Path;

use sieve_common::{dereferenced_copy, ensure_dir, link_or_copy};

use crate::entry::CacheEntry;
use crate::error::CacheError;

/// Materializes every output file of `entry` from `cache_dir` into `out_dir`
/// using the cheapest safe strategy (hard link preferred, copy fallback).
///
/// Parent directories under `out_dir` are created as needed. Files in the
/// cache directory are under our control, so linking is safe; the underlying
/// primitive still refuses to hard-link symlinks.
pub fn promote(cache_dir: &Path, entry: &CacheEntry, out_dir: &Path) -> Result<(), CacheError> {
    for relative_path in &entry.output_files {
        let src = cache_dir.join(relative_path);
        let dst = out_dir.join(relative_path);
        if let Some(parent) = dst.parent() {
            ensure_dir(parent).map_err(|e| CacheError::io(parent, e))?;
        }
        link_or_copy(&src, &dst).map_err(|e| CacheError::io(&src, e))?;
    }
    Ok(())
}

/// Materializes every output file of `entry` from `cache_dir` into
/// `persist_dir` as fully independent copies, never links.
///
/// Persisted-cache contents must remain valid after the scratch cache
/// directory is destroyed. Any stale prior file at a destination is removed
/// first so the copy can never write through an existing hard link.
pub fn durable_promote(
    cache_dir: &Path,
    entry: &CacheEntry,
    persist_dir: &Path,
) -> Result<(), CacheError> {
    for relative_path in &entry.output_files {
        let src = cache_dir.join(relative_path);
        let dst = persist_dir.join(relative_path);
        if let Some(parent) = dst.parent() {
            ensure_dir(parent).map_err(|e| CacheError::io(parent, e))?;
        }
        match std::fs::remove_file(&dst) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(CacheError::io(&dst, e)),
        }
        dereferenced_copy(&src, &dst).map_err(|e| CacheError::io(&src, e))?;
    }
    Ok(())
}
