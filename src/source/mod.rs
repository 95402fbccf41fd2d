//! Snapshot sources - where seed documents for hydration come from.

mod file;
#[cfg(feature = "http")]
mod http;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use file::FileSnapshotSource;
#[cfg(feature = "http")]
pub use http::HttpSnapshotSource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("snapshot not found: {0}")]
    NotFound(String),

    #[error("snapshot {path} answered with status {status}")]
    Status { path: String, status: u16 },

    #[error("failed to fetch snapshot {path}: {message}")]
    Transport { path: String, message: String },

    #[error("snapshot {path} is not valid JSON: {message}")]
    Parse { path: String, message: String },
}

/// A readable store of JSON snapshot documents addressed by path
/// (e.g. `/generated/mocks/users.json`).
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Value, SourceError>;
}
