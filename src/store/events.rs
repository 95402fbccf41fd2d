//! Change notifications fired after every committed mutation.

use serde::{Deserialize, Serialize};

/// What kind of mutation produced a [`ChangeEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Seeded,
    Created,
    Updated,
    Deleted,
    Cleared,
}

/// Payload delivered to change listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub collection: String,
    pub kind: ChangeKind,
    /// Number of records in the collection after the change.
    pub count: usize,
}

#[cfg(feature = "emitter")]
pub(crate) use emitter::ChangeEmitter;

#[cfg(feature = "emitter")]
mod emitter {
    use std::sync::{Mutex, PoisonError};

    use event_emitter_rs::EventEmitter;

    use super::ChangeEvent;

    const CHANGE: &str = "change";

    /// Wraps an `EventEmitter` so listeners can be registered through `&self`.
    pub(crate) struct ChangeEmitter {
        emitter: Mutex<EventEmitter>,
    }

    impl ChangeEmitter {
        pub fn new() -> Self {
            Self {
                emitter: Mutex::new(EventEmitter::new()),
            }
        }

        pub fn on<F>(&self, listener: F) -> String
        where
            F: Fn(ChangeEvent) + Send + Sync + 'static,
        {
            self.emitter
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .on(CHANGE, listener)
        }

        pub fn off(&self, listener_id: &str) -> bool {
            self.emitter
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove_listener(listener_id)
                .is_some()
        }

        /// Fire the event and wait for every listener to finish.
        pub fn emit(&self, event: ChangeEvent) {
            let handles = self
                .emitter
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .emit(CHANGE, event);

            for handle in handles {
                if handle.join().is_err() {
                    tracing::warn!("change listener panicked");
                }
            }
        }
    }
}
