//! Persisted, typed entity collections for prototypes.
//!
//! - [`EntityStore`]: CRUD and batch operations over one collection, saved
//!   as a whole through a [`Persistence`] backend after every mutation.
//! - [`StoreRegistry`] / [`FactoryRegistry`]: stores and synthetic-data
//!   factories keyed by collection name.
//! - [`RepoContext`] / [`Repo`]: the consumer-facing layer, with snapshot
//!   hydration from a [`SnapshotSource`] and population helpers.

extern crate self as entity_store;

mod config;
mod error;
mod factory;
mod persistence;
mod record;
mod repository;
mod source;
mod store;

pub use config::{ConfigError, RepoConfig, DEFAULT_MOCKS_PATH, DEFAULT_NAMESPACE};
pub use error::StoreError;
pub use factory::{FactoryError, FactoryRegistry};
pub use persistence::{FilePersistence, InMemoryPersistence, Persistence, PersistenceError};
pub use record::{generate_id, Record, Timestamp};
pub use repository::{Hydration, ItemRepo, Repo, RepoContext, RepoContextBuilder};
#[cfg(feature = "http")]
pub use source::HttpSnapshotSource;
pub use source::{FileSnapshotSource, SnapshotSource, SourceError};
pub use store::{ChangeEvent, ChangeKind, EntityStore, StoreRegistry};

// Derive macro for `Record`
pub use entity_store_macros::Record;

// Re-exported for implementing `SnapshotSource`
pub use async_trait::async_trait;
