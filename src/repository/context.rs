use std::sync::Arc;

use crate::config::RepoConfig;
use crate::error::StoreError;
use crate::factory::FactoryRegistry;
use crate::persistence::{InMemoryPersistence, Persistence};
use crate::record::Record;
use crate::source::SnapshotSource;
use crate::store::StoreRegistry;

use super::repo::{Hydration, Repo};

/// Application-root context holding the store registry, the factory
/// registry, the snapshot source, and configuration.
///
/// Clone-friendly; clones share registries.
#[derive(Clone)]
pub struct RepoContext {
    stores: StoreRegistry,
    factories: FactoryRegistry,
    source: Option<Arc<dyn SnapshotSource>>,
    config: Arc<RepoConfig>,
}

impl Default for RepoContext {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RepoContext {
    /// In-memory persistence, no snapshot source, default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> RepoContextBuilder {
        RepoContextBuilder::default()
    }

    pub fn stores(&self) -> &StoreRegistry {
        &self.stores
    }

    pub fn factories(&self) -> &FactoryRegistry {
        &self.factories
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    /// Repository over `R`'s default collection.
    pub fn repo<R: Record>(&self) -> Result<Repo<R>, StoreError> {
        self.repo_named(R::COLLECTION)
    }

    /// Repository over the collection `name`.
    pub fn repo_named<R: Record>(&self, name: &str) -> Result<Repo<R>, StoreError> {
        let store = self.stores.resolve::<R>(name)?;
        Ok(Repo::new(
            name,
            store,
            self.factories.clone(),
            self.source.clone(),
            self.config.clone(),
        ))
    }

    /// Resolve the repository for `R` and hydrate it if it is still empty.
    pub async fn mount<R: Record>(&self) -> Result<(Repo<R>, Hydration), StoreError> {
        let repo = self.repo::<R>()?;
        let hydration = repo.hydrate().await?;
        Ok((repo, hydration))
    }

    /// Forget every store and purge its persisted data.
    pub fn clear_all(&self) -> Result<usize, StoreError> {
        self.stores.clear_all()
    }
}

#[derive(Default)]
pub struct RepoContextBuilder {
    persistence: Option<Arc<dyn Persistence>>,
    source: Option<Arc<dyn SnapshotSource>>,
    config: Option<RepoConfig>,
}

impl RepoContextBuilder {
    pub fn persistence(self, persistence: impl Persistence + 'static) -> Self {
        self.shared_persistence(Arc::new(persistence))
    }

    pub fn shared_persistence(mut self, persistence: Arc<dyn Persistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn source(self, source: impl SnapshotSource + 'static) -> Self {
        self.shared_source(Arc::new(source))
    }

    pub fn shared_source(mut self, source: Arc<dyn SnapshotSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn config(mut self, config: RepoConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> RepoContext {
        let config = Arc::new(self.config.unwrap_or_default());
        let persistence: Arc<dyn Persistence> = match self.persistence {
            Some(persistence) => persistence,
            None => Arc::new(InMemoryPersistence::new()),
        };

        RepoContext {
            stores: StoreRegistry::new(persistence, config.clone()),
            factories: FactoryRegistry::new(),
            source: self.source,
            config,
        }
    }
}
