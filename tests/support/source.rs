//! In-memory snapshot source for hydration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use entity_store::{SnapshotSource, SourceError};
use serde_json::Value;

/// Serves fixed documents by path; unknown paths answer 404.
#[derive(Default)]
pub struct StaticSource {
    docs: HashMap<String, Value>,
    fetches: AtomicUsize,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, doc: Value) -> Self {
        self.docs.insert(path.to_string(), doc);
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotSource for StaticSource {
    async fn fetch(&self, path: &str) -> Result<Value, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.docs.get(path).cloned().ok_or_else(|| SourceError::Status {
            path: path.to_string(),
            status: 404,
        })
    }
}
