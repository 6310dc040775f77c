//! Content hashing for cache invalidation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 256-bit content digest computed with BLAKE3.
///
/// Two files with the same `ContentDigest` are assumed to have identical
/// content. Used by the content-digest cache-key mode to detect when a source
/// file has changed regardless of its modification time.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Computes the digest of a byte slice.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}
