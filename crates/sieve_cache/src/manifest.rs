//! Persisted-cache manifest serialization.
//!
//! The manifest is a JSON file inside the persisted cache directory holding
//! the full relative-path → entry map. It is rewritten in full on every
//! teardown that changes the map.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entry::CacheEntry;
use crate::error::CacheError;

/// Name of the manifest file within the persisted cache directory.
const MANIFEST_FILE: &str = "manifest.json";

/// Current manifest format version. Increment on breaking changes; an old
/// version on disk is treated as "no persisted cache yet".
const MANIFEST_FORMAT_VERSION: u32 = 1;

/// The serialized form of the persisted cache map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheManifest {
    /// Manifest format version.
    pub format_version: u32,

    /// Relative-path → entry map, ordered for stable serialization.
    pub entries: BTreeMap<String, CacheEntry>,
}

impl Default for CacheManifest {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheManifest {
    /// Creates a new, empty manifest at the current format version.
    pub fn new() -> Self {
        Self {
            format_version: MANIFEST_FORMAT_VERSION,
            entries: BTreeMap::new(),
        }
    }

    /// Loads the manifest from a cache directory.
    ///
    /// A missing manifest is not an error: it means no cache has been
    /// persisted yet and `None` is returned. So does a manifest written by an
    /// incompatible format version. Any other read failure, and unparseable
    /// JSON, is fatal.
    pub fn load(cache_dir: &Path) -> Result<Option<Self>, CacheError> {
        let path = cache_dir.join(MANIFEST_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io(&path, e)),
        };
        let manifest: Self =
            serde_json::from_str(&content).map_err(|e| CacheError::ManifestParse {
                reason: e.to_string(),
            })?;
        if manifest.format_version != MANIFEST_FORMAT_VERSION {
            log::debug!(
                "ignoring cache manifest with format version {}",
                manifest.format_version
            );
            return Ok(None);
        }
        Ok(Some(manifest))
    }

    /// Writes the manifest into a cache directory, creating it if needed.
    pub fn save(&self, cache_dir: &Path) -> Result<(), CacheError> {
        std::fs::create_dir_all(cache_dir).map_err(|e| CacheError::io(cache_dir, e))?;
        let path = cache_dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        std::fs::write(&path, json).map_err(|e| CacheError::io(&path, e))
    }
}
