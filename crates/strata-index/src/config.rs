//! Index configuration.
//!
//! Loaded from TOML; every field has a default so an empty document is a
//! valid configuration.
//!
//! ```toml
//! backend = "tantivy"
//! index_path = "/var/lib/strata/index"
//! writer_buffer_size = 50000000
//! deferred_updates = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_core::{Error, Result};

/// Smallest writer buffer Tantivy accepts for a single indexing thread.
pub const MIN_WRITER_BUFFER_SIZE: usize = 15_000_000;

/// Index configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Store type: "memory" or "tantivy".
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Path to the index directory (tantivy only).
    #[serde(default)]
    pub index_path: Option<String>,

    /// Index writer buffer size in bytes.
    #[serde(default = "default_writer_buffer_size")]
    pub writer_buffer_size: usize,

    /// Hand non-immediate intents to the background worker.
    #[serde(default = "default_true")]
    pub deferred_updates: bool,
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_writer_buffer_size() -> usize {
    50_000_000
}

fn default_true() -> bool {
    true
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            index_path: None,
            writer_buffer_size: default_writer_buffer_size(),
            deferred_updates: default_true(),
        }
    }
}

impl IndexConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: IndexConfig = toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse index config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        Self::from_toml_str(&content)
    }

    /// Check that the settings are usable.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.backend.as_str(), "memory" | "tantivy") {
            return Err(Error::config(format!(
                "Unknown index backend '{}'",
                self.backend
            )));
        }
        if self.writer_buffer_size < MIN_WRITER_BUFFER_SIZE {
            return Err(Error::config(format!(
                "writer_buffer_size must be at least {MIN_WRITER_BUFFER_SIZE} bytes, got {}",
                self.writer_buffer_size
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_index_config_default() {
        let config = IndexConfig::default();
        assert_eq!(config.backend, "memory");
        assert!(config.index_path.is_none());
        assert_eq!(config.writer_buffer_size, 50_000_000);
        assert!(config.deferred_updates);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_empty_toml_uses_defaults() {
        let config = IndexConfig::from_toml_str("").unwrap();
        assert_eq!(config, IndexConfig::default());
    }

    #[test]
    fn test_from_toml() {
        let config = IndexConfig::from_toml_str(
            r#"
            backend = "tantivy"
            index_path = "/tmp/strata-index"
            deferred_updates = false
            "#,
        )
        .unwrap();

        assert_eq!(config.backend, "tantivy");
        assert_eq!(config.index_path.as_deref(), Some("/tmp/strata-index"));
        assert!(!config.deferred_updates);
    }

    #[test]
    fn test_rejects_unknown_backend() {
        let err = IndexConfig::from_toml_str(r#"backend = "elastic""#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Unknown index backend 'elastic'"
        );
    }

    #[test]
    fn test_rejects_small_writer_buffer() {
        let err = IndexConfig::from_toml_str("writer_buffer_size = 1024").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = IndexConfig::from_toml_str("backend = ").unwrap_err();
        assert!(err.to_string().contains("Failed to parse index config"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.toml");
        std::fs::write(&path, "backend = \"memory\"\n").unwrap();

        let config = IndexConfig::load(&path).unwrap();
        assert_eq!(config.backend, "memory");
    }

    #[test]
    fn test_load_missing_file() {
        let err = IndexConfig::load("/nonexistent/strata/index.toml").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
