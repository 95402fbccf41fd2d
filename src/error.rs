use thiserror::Error;

use crate::factory::FactoryError;
use crate::persistence::PersistenceError;

/// Error type for entity store operations.
///
/// Absence is never an error: lookups return `Option`, deletes return `bool`
/// or counts. These variants cover the storage machinery underneath.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),

    #[error("record serialization error in {collection}: {message}")]
    Serde { collection: String, message: String },

    #[error("collection {collection} is already registered with a different record type")]
    TypeMismatch { collection: String },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Factory(#[from] FactoryError),
}

impl StoreError {
    pub(crate) fn serde(collection: &str, err: impl std::fmt::Display) -> Self {
        StoreError::Serde {
            collection: collection.to_string(),
            message: err.to_string(),
        }
    }
}
