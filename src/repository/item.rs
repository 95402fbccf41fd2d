use std::sync::Arc;

use serde_json::Value;

use crate::error::StoreError;
use crate::record::Record;
use crate::store::EntityStore;

/// Detail-view accessor bound to one record id.
///
/// When built without an id (nothing selected yet), reads return `None` or
/// `false` and writes do nothing.
pub struct ItemRepo<R: Record> {
    id: Option<String>,
    store: Arc<EntityStore<R>>,
}

impl<R: Record> ItemRepo<R> {
    pub(crate) fn new(id: Option<String>, store: Arc<EntityStore<R>>) -> Self {
        Self { id, store }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn get(&self) -> Option<R> {
        self.id.as_deref().and_then(|id| self.store.get_by_id(id))
    }

    pub fn exists(&self) -> bool {
        self.id.as_deref().is_some_and(|id| self.store.exists(id))
    }

    pub fn update(&self, patch: &Value) -> Result<Option<R>, StoreError> {
        match self.id.as_deref() {
            Some(id) => self.store.update(id, patch),
            None => Ok(None),
        }
    }

    pub fn patch(&self, patch: &Value) -> Result<Option<R>, StoreError> {
        self.update(patch)
    }

    pub fn modify(&self, change: impl FnOnce(&mut R)) -> Result<Option<R>, StoreError> {
        match self.id.as_deref() {
            Some(id) => self.store.modify(id, change),
            None => Ok(None),
        }
    }

    pub fn delete(&self) -> Result<bool, StoreError> {
        match self.id.as_deref() {
            Some(id) => self.store.delete(id),
            None => Ok(false),
        }
    }
}
