//! Entity stores - persisted, ordered collections of one record type.
//!
//! Every mutation goes through a single transition: the new state is built
//! on a copy, the whole envelope is saved, and only then does the copy
//! replace the live state. A failed save leaves the store untouched, and
//! readers never observe a half-applied batch.
//!
//! ## Example
//!
//! ```ignore
//! use entity_store::{EntityStore, InMemoryPersistence};
//!
//! let store = EntityStore::<User>::open("users", "app-users", Arc::new(InMemoryPersistence::new()))?;
//! store.init(seed)?;
//! let ada = store.create(User::named("Ada"))?;
//! store.update(ada.id(), &json!({ "name": "Ada L." }))?;
//! ```

mod envelope;
mod events;
mod registry;

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde_json::Value;

use crate::error::StoreError;
use crate::persistence::Persistence;
use crate::record::{generate_id, merge_patch, Record, Timestamp};

use envelope::{Envelope, EnvelopeRef};

pub use events::{ChangeEvent, ChangeKind};
pub use registry::StoreRegistry;

struct StoreState<R> {
    data: Vec<R>,
    initialized: bool,
}

impl<R> Default for StoreState<R> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            initialized: false,
        }
    }
}

impl<R: Clone> Clone for StoreState<R> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            initialized: self.initialized,
        }
    }
}

impl<R: Record> StoreState<R> {
    fn position(&self, id: &str) -> Option<usize> {
        self.data.iter().position(|r| r.id() == id)
    }

    /// Give `record` a fresh id unless the caller supplied one.
    fn assign_id(&self, record: &mut R) {
        if record.has_id() {
            return;
        }
        let mut id = generate_id();
        while self.position(&id).is_some() {
            id = generate_id();
        }
        record.set_id(id);
    }

    /// A manual create counts as initialization, so a later hydration
    /// cannot replace records the caller added.
    fn insert_new(&mut self, mut record: R, now: Timestamp) -> R {
        self.assign_id(&mut record);
        record.set_created_at(now);
        record.set_updated_at(now);
        self.data.push(record.clone());
        self.initialized = true;
        record
    }

    fn seed(&mut self, seed: Vec<R>) {
        self.data = Vec::with_capacity(seed.len());
        for mut record in seed {
            self.assign_id(&mut record);
            self.data.push(record);
        }
        self.initialized = true;
    }
}

/// Result of a transition closure: whether the copy should be committed.
enum Step<T> {
    Commit(ChangeKind, T),
    Skip(T),
}

/// Persisted CRUD container for exactly one collection.
pub struct EntityStore<R: Record> {
    collection: String,
    key: String,
    persistence: Arc<dyn Persistence>,
    state: RwLock<StoreState<R>>,
    #[cfg(feature = "emitter")]
    events: events::ChangeEmitter,
}

impl<R: Record> EntityStore<R> {
    /// Open the store for `collection`, loading whatever `persistence` holds
    /// under `key`. A corrupt envelope is discarded with a warning.
    pub fn open(
        collection: impl Into<String>,
        key: impl Into<String>,
        persistence: Arc<dyn Persistence>,
    ) -> Result<Self, StoreError> {
        let collection = collection.into();
        let key = key.into();

        let state = match persistence.load(&key)? {
            Some(raw) => match Envelope::<R>::decode(&raw) {
                Ok(envelope) => StoreState {
                    data: envelope.data,
                    initialized: envelope.initialized,
                },
                Err(err) => {
                    tracing::warn!(%collection, %key, error = %err, "discarding corrupt store envelope");
                    StoreState::default()
                }
            },
            None => StoreState::default(),
        };

        tracing::debug!(
            %collection,
            %key,
            records = state.data.len(),
            initialized = state.initialized,
            "opened entity store"
        );

        Ok(Self {
            collection,
            key,
            persistence,
            state: RwLock::new(state),
            #[cfg(feature = "emitter")]
            events: events::ChangeEmitter::new(),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Key this store writes under in the persistence layer.
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    // The live state is only ever replaced wholesale after a successful save,
    // so a poisoned lock still guards a consistent value.
    fn read(&self) -> RwLockReadGuard<'_, StoreState<R>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState<R>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition<T>(
        &self,
        apply: impl FnOnce(&mut StoreState<R>) -> Result<Step<T>, StoreError>,
    ) -> Result<T, StoreError> {
        let (kind, count, out) = {
            let mut state = self.write();
            let mut next = state.clone();

            let (kind, out) = match apply(&mut next)? {
                Step::Commit(kind, out) => (kind, out),
                Step::Skip(out) => return Ok(out),
            };

            self.persist(&next)?;
            let count = next.data.len();
            *state = next;
            (kind, count, out)
        };

        #[cfg(feature = "emitter")]
        self.events.emit(ChangeEvent {
            collection: self.collection.clone(),
            kind,
            count,
        });
        #[cfg(not(feature = "emitter"))]
        let _ = (kind, count);

        Ok(out)
    }

    fn persist(&self, state: &StoreState<R>) -> Result<(), StoreError> {
        let raw = EnvelopeRef {
            data: &state.data,
            initialized: state.initialized,
        }
        .encode()
        .map_err(|e| StoreError::serde(&self.collection, e))?;

        self.persistence.save(&self.key, &raw)?;
        tracing::debug!(collection = %self.collection, records = state.data.len(), "saved store");
        Ok(())
    }

    fn patched(&self, record: &R, patch: &Value, now: Timestamp) -> Result<R, StoreError> {
        let mut value =
            serde_json::to_value(record).map_err(|e| StoreError::serde(&self.collection, e))?;
        match patch {
            Value::Object(fields) if fields.contains_key(R::ID_KEY) => {
                let mut fields = fields.clone();
                fields.remove(R::ID_KEY);
                merge_patch(&mut value, &Value::Object(fields));
            }
            _ => merge_patch(&mut value, patch),
        }

        let mut merged: R =
            serde_json::from_value(value).map_err(|e| StoreError::serde(&self.collection, e))?;
        merged.set_id(record.id().to_string());
        merged.set_updated_at(now);
        Ok(merged)
    }

    // ------------------------------------------------------------------
    // Seeding
    // ------------------------------------------------------------------

    /// Seed the collection if it has never been initialized or is empty.
    /// Returns true if the seed was applied.
    pub fn init(&self, seed: Vec<R>) -> Result<bool, StoreError> {
        self.transition(|state| {
            if state.initialized && !state.data.is_empty() {
                return Ok(Step::Skip(false));
            }
            state.seed(seed);
            Ok(Step::Commit(ChangeKind::Seeded, true))
        })
    }

    /// Replace the collection with `seed` unconditionally.
    pub fn reset(&self, seed: Vec<R>) -> Result<(), StoreError> {
        self.transition(|state| {
            state.seed(seed);
            Ok(Step::Commit(ChangeKind::Seeded, ()))
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.read().initialized
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// All records in insertion order.
    pub fn get_all(&self) -> Vec<R> {
        self.read().data.clone()
    }

    pub fn get_by_id(&self, id: &str) -> Option<R> {
        self.read().data.iter().find(|r| r.id() == id).cloned()
    }

    pub fn get_where(&self, predicate: impl Fn(&R) -> bool) -> Vec<R> {
        self.read()
            .data
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }

    pub fn get_first(&self, predicate: impl Fn(&R) -> bool) -> Option<R> {
        self.read().data.iter().find(|r| predicate(r)).cloned()
    }

    pub fn exists(&self, id: &str) -> bool {
        self.read().position(id).is_some()
    }

    pub fn count(&self) -> usize {
        self.read().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().data.is_empty()
    }

    // ------------------------------------------------------------------
    // Single-record writes
    // ------------------------------------------------------------------

    /// Append a record. A caller-supplied id is kept as is; an empty id is
    /// replaced by a generated one. Both timestamps are set to now.
    pub fn create(&self, record: R) -> Result<R, StoreError> {
        self.transition(|state| {
            let created = state.insert_new(record, Utc::now());
            Ok(Step::Commit(ChangeKind::Created, created))
        })
    }

    /// Merge `patch` (a JSON object) over the record with `id`.
    /// Returns None, leaving the collection unchanged, if no such record exists.
    pub fn update(&self, id: &str, patch: &Value) -> Result<Option<R>, StoreError> {
        self.transition(|state| {
            let Some(pos) = state.position(id) else {
                return Ok(Step::Skip(None));
            };
            let updated = self.patched(&state.data[pos], patch, Utc::now())?;
            state.data[pos] = updated.clone();
            Ok(Step::Commit(ChangeKind::Updated, Some(updated)))
        })
    }

    /// Alias of [`EntityStore::update`].
    pub fn patch(&self, id: &str, patch: &Value) -> Result<Option<R>, StoreError> {
        self.update(id, patch)
    }

    /// Typed update: run `change` against the record with `id`.
    pub fn modify(&self, id: &str, change: impl FnOnce(&mut R)) -> Result<Option<R>, StoreError> {
        self.transition(|state| {
            let Some(pos) = state.position(id) else {
                return Ok(Step::Skip(None));
            };
            let record = &mut state.data[pos];
            change(&mut *record);
            record.set_id(id.to_string());
            record.set_updated_at(Utc::now());
            Ok(Step::Commit(ChangeKind::Updated, Some(record.clone())))
        })
    }

    /// Remove the record with `id`. Returns true if it existed.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.transition(|state| match state.position(id) {
            Some(pos) => {
                state.data.remove(pos);
                Ok(Step::Commit(ChangeKind::Deleted, true))
            }
            None => Ok(Step::Skip(false)),
        })
    }

    /// Remove every matching record. Returns how many were removed.
    pub fn delete_where(&self, predicate: impl Fn(&R) -> bool) -> Result<usize, StoreError> {
        self.transition(|state| {
            let before = state.data.len();
            state.data.retain(|r| !predicate(r));
            let removed = before - state.data.len();
            if removed == 0 {
                return Ok(Step::Skip(0));
            }
            Ok(Step::Commit(ChangeKind::Deleted, removed))
        })
    }

    /// Empty the collection. The initialized flag is left as is.
    pub fn delete_all(&self) -> Result<usize, StoreError> {
        self.transition(|state| {
            let removed = state.data.len();
            state.data.clear();
            Ok(Step::Commit(ChangeKind::Cleared, removed))
        })
    }

    // ------------------------------------------------------------------
    // Batches
    // ------------------------------------------------------------------

    /// Append all `records` in one transition. They share one timestamp.
    pub fn create_many(&self, records: Vec<R>) -> Result<Vec<R>, StoreError> {
        self.transition(|state| {
            if records.is_empty() {
                return Ok(Step::Skip(Vec::new()));
            }
            let now = Utc::now();
            let created = records
                .into_iter()
                .map(|record| state.insert_new(record, now))
                .collect();
            Ok(Step::Commit(ChangeKind::Created, created))
        })
    }

    /// Merge `patch` over every listed record that exists. Returns the
    /// updated records; unknown ids are ignored.
    pub fn update_many<I: AsRef<str>>(
        &self,
        ids: &[I],
        patch: &Value,
    ) -> Result<Vec<R>, StoreError> {
        self.transition(|state| {
            let now = Utc::now();
            let mut updated = Vec::new();
            for id in ids {
                if let Some(pos) = state.position(id.as_ref()) {
                    let record = self.patched(&state.data[pos], patch, now)?;
                    state.data[pos] = record.clone();
                    updated.push(record);
                }
            }
            if updated.is_empty() {
                return Ok(Step::Skip(updated));
            }
            Ok(Step::Commit(ChangeKind::Updated, updated))
        })
    }

    /// Remove every listed record. Returns how many were removed.
    pub fn delete_many<I: AsRef<str>>(&self, ids: &[I]) -> Result<usize, StoreError> {
        self.delete_where(|r| ids.iter().any(|id| id.as_ref() == r.id()))
    }

    // ------------------------------------------------------------------
    // Change listeners
    // ------------------------------------------------------------------

    /// Register a listener called after every committed mutation. Returns a
    /// listener id for [`EntityStore::off_change`].
    #[cfg(feature = "emitter")]
    pub fn on_change<F>(&self, listener: F) -> String
    where
        F: Fn(ChangeEvent) + Send + Sync + 'static,
    {
        self.events.on(listener)
    }

    #[cfg(feature = "emitter")]
    pub fn off_change(&self, listener_id: &str) -> bool {
        self.events.off(listener_id)
    }
}
