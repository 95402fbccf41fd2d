//! Factories - named generators of synthetic record bodies.
//!
//! A factory returns a record without id or timestamps; the store assigns
//! those when the bodies are created.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

use crate::record::Record;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FactoryError {
    #[error("no factory registered for {0}")]
    Missing(String),

    #[error("factory {name} does not produce {expected}")]
    TypeMismatch { name: String, expected: &'static str },
}

type BoxedFactory<R> = Box<dyn Fn() -> R + Send + Sync>;

/// Process-scoped map from collection name to factory.
///
/// Clone-friendly via Arc; clones share registrations.
#[derive(Clone, Default)]
pub struct FactoryRegistry {
    factories: Arc<RwLock<HashMap<String, Arc<dyn Any + Send + Sync>>>>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the factory for `name`.
    pub fn register<R, F>(&self, name: impl Into<String>, factory: F)
    where
        R: Record,
        F: Fn() -> R + Send + Sync + 'static,
    {
        let boxed: BoxedFactory<R> = Box::new(factory);
        self.factories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), Arc::new(boxed));
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.factories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }

    pub fn has(&self, name: &str) -> bool {
        self.factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = factories.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn clear(&self) {
        self.factories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Generate one body with the factory registered for `name`.
    pub fn generate_one<R: Record>(&self, name: &str) -> Result<R, FactoryError> {
        let factory = self.lookup(name)?;
        let factory: &BoxedFactory<R> = downcast(name, &factory)?;
        Ok(factory())
    }

    /// Generate `count` bodies with the factory registered for `name`.
    pub fn generate<R: Record>(&self, name: &str, count: usize) -> Result<Vec<R>, FactoryError> {
        let factory = self.lookup(name)?;
        let factory: &BoxedFactory<R> = downcast(name, &factory)?;
        Ok((0..count).map(|_| factory()).collect())
    }

    fn lookup(&self, name: &str) -> Result<Arc<dyn Any + Send + Sync>, FactoryError> {
        self.factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| FactoryError::Missing(name.to_string()))
    }
}

fn downcast<'a, R: Record>(
    name: &str,
    factory: &'a Arc<dyn Any + Send + Sync>,
) -> Result<&'a BoxedFactory<R>, FactoryError> {
    factory
        .downcast_ref::<BoxedFactory<R>>()
        .ok_or_else(|| FactoryError::TypeMismatch {
            name: name.to_string(),
            expected: std::any::type_name::<R>(),
        })
}
