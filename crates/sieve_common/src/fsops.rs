//! Link-or-copy filesystem primitives for output materialization.
//!
//! Build outputs are materialized from cache directories either cheaply
//! (hard link) or durably (full byte copy). Linking is an optimization only:
//! any failure to link falls back to a plain copy, so callers never need to
//! care which strategy was used.

use std::fs;
use std::io;
use std::path::Path;

/// Creates `dst` as the cheapest safe equivalent of `src`.
///
/// Prefers a hard link, falling back to a byte copy if the filesystem
/// refuses (cross-device, permissions, unsupported). A symlink source is
/// always copied: hard-linking a symlink can produce directory hard links
/// on platforms where directories are reached through symlinks.
pub fn link_or_copy(src: &Path, dst: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(src)?;
    if meta.file_type().is_symlink() {
        fs::copy(src, dst)?;
        return Ok(());
    }
    if fs::hard_link(src, dst).is_err() {
        fs::copy(src, dst)?;
    }
    Ok(())
}

/// Copies `src` to `dst` as a fully independent file, following any links.
///
/// Used when the destination must outlive the source directory, e.g. when
/// writing into a persisted cache that survives scratch-directory teardown.
pub fn dereferenced_copy(src: &Path, dst: &Path) -> io::Result<()> {
    fs::copy(src, dst)?;
    Ok(())
}

/// Creates a directory and all missing parents.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}
