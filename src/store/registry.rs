//! StoreRegistry - memoized stores keyed by collection name.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::RepoConfig;
use crate::error::StoreError;
use crate::persistence::Persistence;
use crate::record::Record;

use super::EntityStore;

struct Entry {
    key: String,
    store: Arc<dyn Any + Send + Sync>,
}

/// Resolves one [`EntityStore`] per collection name.
///
/// The same name always yields the same store instance until
/// [`StoreRegistry::clear_all`]. Clone-friendly via Arc.
#[derive(Clone)]
pub struct StoreRegistry {
    persistence: Arc<dyn Persistence>,
    config: Arc<RepoConfig>,
    stores: Arc<RwLock<HashMap<String, Entry>>>,
}

impl StoreRegistry {
    pub fn new(persistence: Arc<dyn Persistence>, config: Arc<RepoConfig>) -> Self {
        Self {
            persistence,
            config,
            stores: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Resolve the store for `R`'s default collection.
    pub fn store<R: Record>(&self) -> Result<Arc<EntityStore<R>>, StoreError> {
        self.resolve(R::COLLECTION)
    }

    /// Resolve (or lazily open) the store named `name`.
    pub fn resolve<R: Record>(&self, name: &str) -> Result<Arc<EntityStore<R>>, StoreError> {
        {
            let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = stores.get(name) {
                return downcast(name, &entry.store);
            }
        }

        let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have opened it between the two locks.
        if let Some(entry) = stores.get(name) {
            return downcast(name, &entry.store);
        }

        let key = self.config.storage_key(name);
        let store = Arc::new(EntityStore::<R>::open(
            name,
            key.clone(),
            self.persistence.clone(),
        )?);
        stores.insert(
            name.to_string(),
            Entry {
                key,
                store: store.clone(),
            },
        );
        Ok(store)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Names of every store opened so far, sorted.
    pub fn names(&self) -> Vec<String> {
        let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = stores.keys().cloned().collect();
        names.sort();
        names
    }

    /// Forget every store and remove the persistence entries they wrote.
    /// Returns how many stores were cleared.
    pub fn clear_all(&self) -> Result<usize, StoreError> {
        let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);
        let names: Vec<String> = stores.keys().cloned().collect();

        for name in &names {
            if let Some(entry) = stores.get(name) {
                self.persistence.remove(&entry.key)?;
                tracing::debug!(collection = %name, key = %entry.key, "cleared store");
            }
            stores.remove(name);
        }
        Ok(names.len())
    }
}

fn downcast<R: Record>(
    name: &str,
    store: &Arc<dyn Any + Send + Sync>,
) -> Result<Arc<EntityStore<R>>, StoreError> {
    store
        .clone()
        .downcast::<EntityStore<R>>()
        .map_err(|_| StoreError::TypeMismatch {
            collection: name.to_string(),
        })
}
