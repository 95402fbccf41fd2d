//! InMemoryPersistence - HashMap-backed persistence for tests and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{Persistence, PersistenceError};

/// In-memory persistence backed by `Arc<RwLock<HashMap>>`.
///
/// Clone-friendly (cloning shares the same underlying storage), which lets a
/// test drop every store and reopen them against the same data.
#[derive(Clone, Default)]
pub struct InMemoryPersistence {
    storage: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently stored, sorted.
    pub fn keys(&self) -> Result<Vec<String>, PersistenceError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| PersistenceError::LockPoisoned("keys"))?;
        let mut keys: Vec<String> = storage.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

impl Persistence for InMemoryPersistence {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| PersistenceError::LockPoisoned("load"))?;
        Ok(storage.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| PersistenceError::LockPoisoned("save"))?;
        storage.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, PersistenceError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| PersistenceError::LockPoisoned("remove"))?;
        Ok(storage.remove(key).is_some())
    }
}
