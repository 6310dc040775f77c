//! Filter configuration: extension filtering, encodings, hashing mode, and
//! the persisted-cache identity.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, EncodingError};

/// Text encoding used to decode input files and encode output files.
///
/// UTF-8 is the default; Latin-1 covers the 8-bit single-byte case without
/// pulling in a full transcoding stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    /// UTF-8 (the default).
    #[default]
    Utf8,
    /// ISO-8859-1: every byte maps to the Unicode code point of equal value.
    Latin1,
}

impl TextEncoding {
    /// Decodes raw file bytes into a string.
    pub fn decode(self, bytes: &[u8]) -> Result<String, EncodingError> {
        match self {
            Self::Utf8 => Ok(String::from_utf8(bytes.to_vec())?),
            Self::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }

    /// Encodes a string into raw file bytes.
    pub fn encode(self, content: &str) -> Result<Vec<u8>, EncodingError> {
        match self {
            Self::Utf8 => Ok(content.as_bytes().to_vec()),
            Self::Latin1 => content
                .chars()
                .map(|c| {
                    u8::try_from(c as u32).map_err(|_| EncodingError::Unrepresentable(c))
                })
                .collect(),
        }
    }
}

/// Immutable per-engine filter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Source extensions (without the dot) routed to the transform.
    pub extensions: Vec<String>,

    /// Optional extension rewrite for destination paths (without the dot).
    #[serde(default)]
    pub target_extension: Option<String>,

    /// Encoding used to decode input files.
    #[serde(default)]
    pub input_encoding: TextEncoding,

    /// Encoding used to encode output files.
    #[serde(default)]
    pub output_encoding: TextEncoding,

    /// Use content-digest cache keys instead of the default
    /// path/size/mtime identity.
    #[serde(default)]
    pub cache_by_content: bool,

    /// Unique identifier namespacing the persisted cache directory, so that
    /// distinct transform instances never collide. Required.
    pub cache_id: String,

    /// Directory under which the persisted cache directory is created.
    #[serde(default = "default_persist_root")]
    pub persist_root: PathBuf,
}

fn default_persist_root() -> PathBuf {
    PathBuf::from("tmp")
}

impl FilterConfig {
    /// Creates a configuration with the given cache identifier and
    /// recognized extensions; everything else takes its default.
    pub fn new(cache_id: impl Into<String>, extensions: &[&str]) -> Self {
        Self {
            extensions: extensions.iter().map(|s| s.to_string()).collect(),
            target_extension: None,
            input_encoding: TextEncoding::Utf8,
            output_encoding: TextEncoding::Utf8,
            cache_by_content: false,
            cache_id: cache_id.into(),
            persist_root: default_persist_root(),
        }
    }

    /// Sets the destination-extension rewrite rule.
    pub fn with_target_extension(mut self, extension: &str) -> Self {
        self.target_extension = Some(extension.to_string());
        self
    }

    /// Enables content-digest cache keys.
    pub fn with_content_hashing(mut self, enabled: bool) -> Self {
        self.cache_by_content = enabled;
        self
    }

    /// Sets the directory the persisted cache directory is created under.
    pub fn with_persist_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.persist_root = root.into();
        self
    }

    /// Sets both text encodings.
    pub fn with_encodings(mut self, input: TextEncoding, output: TextEncoding) -> Self {
        self.input_encoding = input;
        self.output_encoding = output;
        self
    }

    /// Validates required fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_id.trim().is_empty() {
            return Err(ConfigError::MissingField("cache_id".to_string()));
        }
        Ok(())
    }

    /// The deterministically named persisted cache directory for this
    /// configuration.
    pub fn persist_dir(&self) -> PathBuf {
        self.persist_root.join(format!("filter-cache-{}", self.cache_id))
    }

    /// Maps a source-relative path to its destination-relative path, or
    /// `None` if the file is not processable.
    ///
    /// A file is processable when it ends in `.<ext>` for one of the
    /// recognized extensions; the target extension, when configured,
    /// replaces the matched one.
    pub fn dest_path(&self, relative_path: &str) -> Option<String> {
        for extension in &self.extensions {
            let suffix = format!(".{extension}");
            if relative_path.ends_with(&suffix) {
                return Some(match &self.target_extension {
                    Some(target) => format!(
                        "{}{target}",
                        &relative_path[..relative_path.len() - extension.len()]
                    ),
                    None => relative_path.to_string(),
                });
            }
        }
        None
    }

    /// Loads and validates a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates a configuration from a TOML string.
    ///
    /// Useful for testing without filesystem dependencies.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dest_path_matches_recognized_extension() {
        let config = FilterConfig::new("c", &["txt", "md"]);
        assert_eq!(config.dest_path("notes/a.txt").as_deref(), Some("notes/a.txt"));
        assert_eq!(config.dest_path("b.md").as_deref(), Some("b.md"));
        assert_eq!(config.dest_path("c.rs"), None);
    }

    #[test]
    fn dest_path_requires_the_dot() {
        let config = FilterConfig::new("c", &["txt"]);
        assert_eq!(config.dest_path("atxt"), None);
        assert_eq!(config.dest_path("txt"), None);
    }

    #[test]
    fn dest_path_rewrites_target_extension() {
        let config = FilterConfig::new("c", &["txt"]).with_target_extension("md");
        assert_eq!(config.dest_path("a.txt").as_deref(), Some("a.md"));
        assert_eq!(config.dest_path("sub/b.txt").as_deref(), Some("sub/b.md"));
    }

    #[test]
    fn empty_cache_id_fails_validation() {
        let config = FilterConfig::new("", &["txt"]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField(field)) if field == "cache_id"
        ));
    }

    #[test]
    fn persist_dir_is_namespaced_by_cache_id() {
        let a = FilterConfig::new("alpha", &["txt"]).with_persist_root("/cache");
        let b = FilterConfig::new("beta", &["txt"]).with_persist_root("/cache");
        assert_ne!(a.persist_dir(), b.persist_dir());
        assert!(a.persist_dir().starts_with("/cache"));
    }

    #[test]
    fn parse_minimal_toml() {
        let config = FilterConfig::from_toml_str(
            r#"
extensions = ["txt"]
cache_id = "docs"
"#,
        )
        .unwrap();
        assert_eq!(config.extensions, vec!["txt"]);
        assert_eq!(config.cache_id, "docs");
        assert!(!config.cache_by_content);
        assert_eq!(config.persist_root, PathBuf::from("tmp"));
    }

    #[test]
    fn parse_full_toml() {
        let config = FilterConfig::from_toml_str(
            r#"
extensions = ["txt", "md"]
target_extension = "html"
input_encoding = "latin1"
output_encoding = "utf8"
cache_by_content = true
cache_id = "render"
persist_root = "build/cache"
"#,
        )
        .unwrap();
        assert_eq!(config.target_extension.as_deref(), Some("html"));
        assert_eq!(config.input_encoding, TextEncoding::Latin1);
        assert!(config.cache_by_content);
        assert_eq!(config.persist_root, PathBuf::from("build/cache"));
    }

    #[test]
    fn toml_without_cache_id_is_rejected() {
        let err = FilterConfig::from_toml_str(r#"extensions = ["txt"]"#).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn utf8_roundtrip() {
        let enc = TextEncoding::Utf8;
        let bytes = enc.encode("grüß").unwrap();
        assert_eq!(enc.decode(&bytes).unwrap(), "grüß");
    }

    #[test]
    fn latin1_decodes_high_bytes() {
        let enc = TextEncoding::Latin1;
        let decoded = enc.decode(&[0x67, 0xFC]).unwrap();
        assert_eq!(decoded, "gü");
        assert_eq!(enc.encode(&decoded).unwrap(), vec![0x67, 0xFC]);
    }

    #[test]
    fn latin1_rejects_wide_chars() {
        assert!(matches!(
            TextEncoding::Latin1.encode("日"),
            Err(EncodingError::Unrepresentable('日'))
        ));
    }

    #[test]
    fn utf8_rejects_invalid_bytes() {
        assert!(matches!(
            TextEncoding::Utf8.decode(&[0xFF, 0xFE]),
            Err(EncodingError::InvalidUtf8(_))
        ));
    }
}
