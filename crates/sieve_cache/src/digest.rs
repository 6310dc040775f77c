//! Memoized content digests keyed by path and modification time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use sieve_common::ContentDigest;

use crate::error::CacheError;

/// A cached digest, valid only while the file's mtime is unchanged.
#[derive(Debug, Clone, Copy)]
struct DigestEntry {
    mtime: SystemTime,
    digest: ContentDigest,
}

/// Memo of file content digests, consulted only in content-digest key mode.
///
/// Content hashing is correctness-first but costs a full read per file; this
/// cache skips the read when a file's modification time has not moved since
/// the digest was last computed. A touched-but-unchanged file is re-read and
/// re-digested, which restores the (identical) digest and refreshes the memo.
#[derive(Debug, Default)]
pub struct DigestCache {
    entries: HashMap<PathBuf, DigestEntry>,
}

impl DigestCache {
    /// Creates an empty digest cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the digest of `path`, reading the file only when the memoized
    /// digest's mtime no longer matches `mtime`.
    pub fn digest(&mut self, path: &Path, mtime: SystemTime) -> Result<ContentDigest, CacheError> {
        if let Some(cached) = self.entries.get(path) {
            if cached.mtime == mtime {
                return Ok(cached.digest);
            }
        }
        let bytes = std::fs::read(path).map_err(|e| CacheError::io(path, e))?;
        let digest = ContentDigest::from_bytes(&bytes);
        self.entries
            .insert(path.to_path_buf(), DigestEntry { mtime, digest });
        Ok(digest)
    }

    /// Number of memoized digests.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been memoized yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn mtime_of(path: &Path) -> SystemTime {
        fs::metadata(path).unwrap().modified().unwrap()
    }

    #[test]
    fn digest_matches_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.txt");
        fs::write(&path, b"content").unwrap();

        let mut cache = DigestCache::new();
        let d = cache.digest(&path, mtime_of(&path)).unwrap();
        assert_eq!(d, ContentDigest::from_bytes(b"content"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn unchanged_mtime_skips_reread() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.txt");
        fs::write(&path, b"original").unwrap();
        let mtime = mtime_of(&path);

        let mut cache = DigestCache::new();
        let first = cache.digest(&path, mtime).unwrap();

        // Rewrite the content but present the old mtime: the memo must win.
        fs::write(&path, b"rewritten").unwrap();
        let second = cache.digest(&path, mtime).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn changed_mtime_recomputes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.txt");
        fs::write(&path, b"original").unwrap();
        let mtime = mtime_of(&path);

        let mut cache = DigestCache::new();
        let first = cache.digest(&path, mtime).unwrap();

        fs::write(&path, b"rewritten").unwrap();
        filetime::set_file_mtime(&path, filetime::FileTime::from_unix_time(1_500_000_000, 0))
            .unwrap();
        let second = cache.digest(&path, mtime_of(&path)).unwrap();
        assert_ne!(first, second);
        assert_eq!(second, ContentDigest::from_bytes(b"rewritten"));
    }

    #[test]
    fn missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = DigestCache::new();
        let err = cache
            .digest(&dir.path().join("missing.txt"), SystemTime::now())
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
