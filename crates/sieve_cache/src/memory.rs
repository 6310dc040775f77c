//! Per-process in-memory cache.

use std::collections::BTreeMap;

use crate::entry::CacheEntry;

/// Mapping from source-relative path to cache entry, valid for the lifetime
/// of one engine instance.
///
/// Created empty, populated only by successful transform runs and by
/// persisted-cache promotions. It is never written to disk itself; at session
/// teardown it is the source the persisted cache merges from.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: BTreeMap<String, CacheEntry>,
}

impl MemoryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the entry for a source-relative path.
    pub fn get(&self, relative_path: &str) -> Option<&CacheEntry> {
        self.entries.get(relative_path)
    }

    /// Records the entry for a source-relative path, replacing any prior one.
    pub fn insert(&mut self, relative_path: String, entry: CacheEntry) {
        self.entries.insert(relative_path, entry);
    }

    /// Iterates entries in path order (deterministic merge order).
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CacheEntry)> {
        self.entries.iter()
    }

    /// Number of cached paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been cached this session.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops all entries. Used at session teardown once the entries have
    /// been merged into the persisted cache.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let cache = MemoryCache::new();
        assert!(cache.is_empty());
        assert!(cache.get("a.txt").is_none());
    }

    #[test]
    fn insert_replaces() {
        let mut cache = MemoryCache::new();
        cache.insert(
            "a.txt".to_string(),
            CacheEntry::single("a.txt", "a.txt", "k1".to_string()),
        );
        cache.insert(
            "a.txt".to_string(),
            CacheEntry::single("a.txt", "a.txt", "k2".to_string()),
        );
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a.txt").unwrap().hash, "k2");
    }

    #[test]
    fn iteration_is_path_ordered() {
        let mut cache = MemoryCache::new();
        cache.insert(
            "b.txt".to_string(),
            CacheEntry::single("b.txt", "b.txt", "k".to_string()),
        );
        cache.insert(
            "a.txt".to_string(),
            CacheEntry::single("a.txt", "a.txt", "k".to_string()),
        );
        let paths: Vec<&str> = cache.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, vec!["a.txt", "b.txt"]);
    }
}
