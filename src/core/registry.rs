// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Thread-safe name registry.
//!
//! Used by [`crate::encoding::ProtobufCodec`] to cache descriptor pools by
//! message type name so each `FileDescriptorSet` is linked once and then
//! shared read-only.

use std::collections::HashMap;
use std::sync::RwLock;

use super::error::{CodecError, Result};

/// Thread-safe registry mapping names to shared, cheaply clonable entries.
///
/// Uses RwLock for concurrent read access with exclusive write access.
pub struct TypeRegistry<T> {
    inner: RwLock<HashMap<String, T>>,
}

fn poisoned<E: std::fmt::Display>(e: E) -> CodecError {
    CodecError::Other(format!("Registry lock poisoned: {e}"))
}

impl<T> TypeRegistry<T> {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Register an entry, replacing any previous entry of the same name.
    pub fn register(&self, name: impl Into<String>, entry: T) -> Result<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.insert(name.into(), entry);
        Ok(())
    }

    /// Get an entry by name.
    pub fn get(&self, name: &str) -> Result<Option<T>>
    where
        T: Clone,
    {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.get(name).cloned())
    }

    /// Get an entry by name, registering the result of `make` if absent.
    ///
    /// `make` runs without the lock held; if another thread registered the
    /// name meanwhile, its entry wins.
    pub fn get_or_try_insert_with<F>(&self, name: &str, make: F) -> Result<T>
    where
        T: Clone,
        F: FnOnce() -> Result<T>,
    {
        if let Some(existing) = self.get(name)? {
            return Ok(existing);
        }
        let created = make()?;
        let mut inner = self.inner.write().map_err(poisoned)?;
        Ok(inner.entry(name.to_string()).or_insert(created).clone())
    }

    /// Check if an entry is registered.
    pub fn contains(&self, name: &str) -> Result<bool> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.contains_key(name))
    }

    /// Get all registered names, sorted.
    pub fn names(&self) -> Result<Vec<String>> {
        let inner = self.inner.read().map_err(poisoned)?;
        let mut names: Vec<String> = inner.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Remove an entry from the registry.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        Ok(inner.remove(name).is_some())
    }

    /// Get the number of registered entries.
    pub fn len(&self) -> Result<usize> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.len())
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl<T> Default for TypeRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
