//! Store connection configuration
//!
//! ```json
//! { "backend": "file", "dataFile": "./firestore-export.json" }
//! ```
//!
//! A relative `dataFile` is resolved against the directory of the config
//! file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::errors::{StoreError, StoreResult};
use super::file::FileStore;
use super::memory::MemoryStore;
use super::Backend;

/// Which store to audit
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    /// JSON export file
    File {
        #[serde(rename = "dataFile")]
        data_file: PathBuf,
    },
    /// Empty in-memory store
    Memory,
}

impl StoreConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> StoreResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            StoreError::InvalidConfig(format!(
                "Failed to read store config {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: StoreConfig = serde_json::from_str(&content).map_err(|e| {
            StoreError::InvalidConfig(format!(
                "Invalid store config {}: {}",
                path.display(),
                e
            ))
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.resolved_against(base))
    }

    fn resolved_against(self, base: &Path) -> Self {
        match self {
            StoreConfig::File { data_file } if data_file.is_relative() => StoreConfig::File {
                data_file: base.join(data_file),
            },
            other => other,
        }
    }

    /// Opens the configured backend.
    pub fn connect(&self) -> StoreResult<Backend> {
        match self {
            StoreConfig::File { data_file } => FileStore::open(data_file).map(Backend::File),
            StoreConfig::Memory => Ok(Backend::Memory(MemoryStore::new())),
        }
    }

    /// Short backend name for logs
    pub fn backend_name(&self) -> &'static str {
        match self {
            StoreConfig::File { .. } => "file",
            StoreConfig::Memory => "memory",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_relative_data_file_resolves_next_to_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("docaudit.json");
        fs::write(&config_path, r#"{"backend": "file", "dataFile": "export.json"}"#).unwrap();

        let config = StoreConfig::load(&config_path).unwrap();
        assert_eq!(
            config,
            StoreConfig::File {
                data_file: dir.path().join("export.json")
            }
        );
    }

    #[test]
    fn test_memory_backend() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("docaudit.json");
        fs::write(&config_path, r#"{"backend": "memory"}"#).unwrap();

        let config = StoreConfig::load(&config_path).unwrap();
        assert_eq!(config.backend_name(), "memory");
        assert!(matches!(config.connect(), Ok(Backend::Memory(_))));
    }

    #[test]
    fn test_missing_or_unknown_config() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            StoreConfig::load(&dir.path().join("absent.json")),
            Err(StoreError::InvalidConfig(_))
        ));

        let config_path = dir.path().join("docaudit.json");
        fs::write(&config_path, r#"{"backend": "postgres"}"#).unwrap();
        assert!(matches!(
            StoreConfig::load(&config_path),
            Err(StoreError::InvalidConfig(_))
        ));
    }
}
