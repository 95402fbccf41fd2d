//! Persistence - durable key-value storage for store envelopes.
//!
//! The port stores raw strings. Encoding is the store's concern, so a backend
//! only has to move strings in and out by key.

mod file;
mod in_memory;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use file::FilePersistence;
pub use in_memory::InMemoryPersistence;

/// Error type for persistence backends.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("persistence lock poisoned during {0}")]
    LockPoisoned(&'static str),

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Key-value storage addressed by string keys.
pub trait Persistence: Send + Sync {
    /// Read the value stored under `key`. Returns None if nothing is stored.
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Write (or overwrite) the value under `key` in one shot.
    fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// Remove `key`. Returns true if a value existed.
    fn remove(&self, key: &str) -> Result<bool, PersistenceError>;
}
