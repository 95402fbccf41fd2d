use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use super::{SnapshotSource, SourceError};

/// Reads snapshot documents from a local directory. The snapshot path is
/// resolved relative to `root`, so `/generated/mocks/users.json` maps to
/// `<root>/generated/mocks/users.json`.
///
/// `fetch` reads with a blocking `std::fs` call on the calling task.
#[derive(Clone, Debug)]
pub struct FileSnapshotSource {
    root: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

#[async_trait]
impl SnapshotSource for FileSnapshotSource {
    async fn fetch(&self, path: &str) -> Result<Value, SourceError> {
        let file = self.resolve(path);
        let raw = std::fs::read_to_string(&file).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => SourceError::NotFound(path.to_string()),
            _ => SourceError::Transport {
                path: path.to_string(),
                message: err.to_string(),
            },
        })?;

        serde_json::from_str(&raw).map_err(|err| SourceError::Parse {
            path: path.to_string(),
            message: err.to_string(),
        })
    }
}
