//! Records - uniquely identified values stored in a collection.
//!
//! ## Example
//!
//! ```ignore
//! use entity_store::{Record, Timestamp};
//!
//! #[derive(Clone, Serialize, Deserialize, Record)]
//! #[record(collection = "users")]
//! struct User {
//!     #[serde(default)]
//!     id: String,
//!     name: String,
//!     #[serde(rename = "createdAt", default)]
//!     created_at: Option<Timestamp>,
//!     #[serde(rename = "updatedAt", default)]
//!     updated_at: Option<Timestamp>,
//! }
//! ```

mod id;
mod patch;

use serde::{de::DeserializeOwned, Serialize};

pub use id::generate_id;
pub(crate) use patch::merge_patch;

/// Creation/modification instant, serialized as ISO-8601.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Trait for types that can be stored in an entity store.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Default collection name for this record type (e.g., "users").
    const COLLECTION: &'static str;

    /// Serialized name of the id field. Patches never overwrite this key.
    const ID_KEY: &'static str = "id";

    /// Returns the unique identifier. An empty string means "not assigned yet".
    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    fn created_at(&self) -> Option<Timestamp> {
        None
    }

    fn set_created_at(&mut self, _at: Timestamp) {}

    fn updated_at(&self) -> Option<Timestamp> {
        None
    }

    fn set_updated_at(&mut self, _at: Timestamp) {}

    /// Whether the record carries an identifier.
    fn has_id(&self) -> bool {
        !self.id().is_empty()
    }
}
