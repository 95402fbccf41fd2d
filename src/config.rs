//! Repository configuration.
//!
//! ```toml
//! namespace = "crm-prototype"
//! mocks_path = "/generated/mocks"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_NAMESPACE: &str = "entity-store";
pub const DEFAULT_MOCKS_PATH: &str = "/generated/mocks";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Prefix for persistence keys, so several prototypes can share a backend.
    pub namespace: String,
    /// Directory (URL path) holding `<name>.json` snapshots.
    pub mocks_path: String,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            mocks_path: DEFAULT_MOCKS_PATH.to_string(),
        }
    }
}

impl RepoConfig {
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_mocks_path(mut self, mocks_path: impl Into<String>) -> Self {
        self.mocks_path = mocks_path.into();
        self
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Persistence key for a collection.
    pub fn storage_key(&self, collection: &str) -> String {
        format!("{}-{}", self.namespace, collection)
    }

    /// Location of the snapshot document for `name`.
    pub fn mock_path(&self, name: &str) -> String {
        format!("{}/{}.json", self.mocks_path.trim_end_matches('/'), name)
    }
}
