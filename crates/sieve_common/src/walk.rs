//! Ordered directory-tree enumeration.
//!
//! Each build walks the full input tree once. The walk produces
//! `/`-separated paths relative to the root, sorted so that every directory
//! precedes its own contents, which lets consumers mirror the directory
//! layout before filling it with files.

use std::io;
use std::path::Path;

/// One entry from a tree walk: a relative path plus a directory marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path relative to the walk root, `/`-separated on all platforms.
    pub relative_path: String,
    /// `true` for directories, `false` for files (and symlinks to files).
    pub is_dir: bool,
}

/// Enumerates all entries under `root`, sorted by relative path.
///
/// The root itself is not included. Path ordering is lexicographic, which
/// guarantees parents appear before their children.
pub fn walk_tree(root: &Path) -> io::Result<Vec<WalkEntry>> {
    let mut entries = Vec::new();
    walk_into(root, "", &mut entries)?;
    entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(entries)
}

fn walk_into(dir: &Path, prefix: &str, entries: &mut Vec<WalkEntry>) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_str().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("non-UTF-8 file name in {}", dir.display()),
            )
        })?;
        let relative_path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        };
        let path = entry.path();
        if path.is_dir() {
            entries.push(WalkEntry {
                relative_path: relative_path.clone(),
                is_dir: true,
            });
            walk_into(&path, &relative_path, entries)?;
        } else {
            entries.push(WalkEntry {
                relative_path,
                is_dir: false,
            });
        }
    }
    Ok(())
}
