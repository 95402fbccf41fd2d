use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde_json::Value;

use crate::config::RepoConfig;
use crate::error::StoreError;
use crate::factory::{FactoryError, FactoryRegistry};
use crate::record::Record;
use crate::source::SnapshotSource;
use crate::store::EntityStore;

use super::item::ItemRepo;

/// Outcome of [`Repo::hydrate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hydration {
    /// The snapshot was applied; carries the number of records seeded.
    Seeded(usize),
    /// The store already held data, so no snapshot was requested or applied.
    AlreadyInitialized,
    /// No snapshot could be obtained; the store was left as it was.
    Unavailable(String),
}

impl fmt::Display for Hydration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hydration::Seeded(count) => write!(f, "seeded {} records", count),
            Hydration::AlreadyInitialized => write!(f, "already initialized"),
            Hydration::Unavailable(reason) => write!(f, "unavailable: {}", reason),
        }
    }
}

/// One collection's store plus hydration and population helpers.
///
/// Derefs to [`EntityStore`], so every CRUD operation is available directly.
pub struct Repo<R: Record> {
    name: String,
    store: Arc<EntityStore<R>>,
    factories: FactoryRegistry,
    source: Option<Arc<dyn SnapshotSource>>,
    config: Arc<RepoConfig>,
}

impl<R: Record> Clone for Repo<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            store: self.store.clone(),
            factories: self.factories.clone(),
            source: self.source.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R: Record> Deref for Repo<R> {
    type Target = EntityStore<R>;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

impl<R: Record> Repo<R> {
    pub(crate) fn new(
        name: &str,
        store: Arc<EntityStore<R>>,
        factories: FactoryRegistry,
        source: Option<Arc<dyn SnapshotSource>>,
        config: Arc<RepoConfig>,
    ) -> Self {
        Self {
            name: name.to_string(),
            store,
            factories,
            source,
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &Arc<EntityStore<R>> {
        &self.store
    }

    /// Seed the store from `<mocks_path>/<name>.json` if it is uninitialized
    /// or empty.
    pub async fn hydrate(&self) -> Result<Hydration, StoreError> {
        let name = self.name.clone();
        self.hydrate_from(&name).await
    }

    /// Like [`Repo::hydrate`], reading `<mocks_path>/<file_name>.json` instead.
    pub async fn hydrate_from(&self, file_name: &str) -> Result<Hydration, StoreError> {
        if self.store.is_initialized() && !self.store.is_empty() {
            return Ok(Hydration::AlreadyInitialized);
        }

        let Some(source) = &self.source else {
            tracing::debug!(collection = %self.name, "no snapshot source configured");
            return Ok(Hydration::Unavailable("no snapshot source configured".into()));
        };

        let path = self.config.mock_path(file_name);
        let payload = match source.fetch(&path).await {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(collection = %self.name, %path, error = %err, "failed to load snapshot");
                return Ok(Hydration::Unavailable(err.to_string()));
            }
        };

        let seed = self.parse_seed(payload);
        let seeded = seed.len();
        if !self.store.init(seed)? {
            return Ok(Hydration::AlreadyInitialized);
        }

        tracing::debug!(collection = %self.name, %path, seeded, "hydrated store");
        Ok(Hydration::Seeded(seeded))
    }

    fn parse_seed(&self, payload: Value) -> Vec<R> {
        let Value::Array(items) = payload else {
            tracing::warn!(collection = %self.name, "snapshot is not an array, seeding empty");
            return Vec::new();
        };

        items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value(item) {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!(collection = %self.name, index, error = %err, "skipping snapshot row");
                    None
                }
            })
            .collect()
    }

    /// Create `count` records from the factory registered under this
    /// repository's name, optionally emptying the collection first.
    /// Without a registered factory nothing happens and an empty list is
    /// returned.
    pub fn populate(&self, count: usize, replace: bool) -> Result<Vec<R>, StoreError> {
        let bodies = match self.factories.generate::<R>(&self.name, count) {
            Ok(bodies) => bodies,
            Err(FactoryError::Missing(name)) => {
                tracing::warn!(collection = %name, "no factory registered, skipping populate");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };
        self.insert_generated(bodies, replace)
    }

    /// Like [`Repo::populate`] with a one-off factory.
    pub fn populate_with(
        &self,
        count: usize,
        factory: impl FnMut() -> R,
        replace: bool,
    ) -> Result<Vec<R>, StoreError> {
        let bodies = std::iter::repeat_with(factory).take(count).collect();
        self.insert_generated(bodies, replace)
    }

    fn insert_generated(&self, bodies: Vec<R>, replace: bool) -> Result<Vec<R>, StoreError> {
        if replace {
            self.store.delete_all()?;
        }
        self.store.create_many(bodies)
    }

    /// Projection bound to a single id. With `None` every operation is a no-op.
    pub fn item(&self, id: Option<&str>) -> ItemRepo<R> {
        ItemRepo::new(id.map(str::to_string), self.store.clone())
    }
}
