//! Cache entry model.

use serde::{Deserialize, Serialize};

/// One logical cache entry: a set of input files mapped to a set of output
/// files plus the validity hash recorded when the entry was produced.
///
/// An entry is a hit iff recomputing the key over `input_files` against the
/// current source tree yields exactly `hash`. The hash covers every declared
/// input in order, so a change to any of them (or a reordering) invalidates
/// the entry. Most transforms are one-to-one, but an entry may declare
/// several inputs or outputs (many-to-one and one-to-many transforms).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Source-relative paths the entry's key is computed over.
    pub input_files: Vec<String>,

    /// Destination-relative paths the entry produces.
    pub output_files: Vec<String>,

    /// The key recorded when the entry was produced.
    pub hash: String,
}

impl CacheEntry {
    /// Creates the common one-input, one-output entry.
    pub fn single(input: &str, output: &str, hash: String) -> Self {
        Self {
            input_files: vec![input.to_string()],
            output_files: vec![output.to_string()],
            hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_entry_shape() {
        let entry = CacheEntry::single("a.txt", "a.md", "k1".to_string());
        assert_eq!(entry.input_files, vec!["a.txt"]);
        assert_eq!(entry.output_files, vec!["a.md"]);
        assert_eq!(entry.hash, "k1");
    }

    #[test]
    fn serde_roundtrip() {
        let entry = CacheEntry {
            input_files: vec!["a.txt".to_string(), "b.txt".to_string()],
            output_files: vec!["out/ab.txt".to_string()],
            hash: "h".to_string(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        let back: CacheEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
    }
}
