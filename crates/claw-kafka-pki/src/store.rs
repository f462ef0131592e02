//! Read-only access to the platform's resource store.
//!
//! The planner, the ownership binder and the bootstrap assembler only ever
//! read through [`ResourceStore`]. [`MemoryStore`] is an in-memory
//! implementation for tests and embedders.

// Lock guards are held only for the duration of a single lookup.
#![allow(clippy::significant_drop_tightening)]

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;
use tracing::debug;

use crate::types::SecretData;

/// Result type for store lookups.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors returned by a [`ResourceStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The object does not exist.
    #[error("{kind} {name} not found")]
    NotFound {
        /// Object kind.
        kind: String,
        /// Object name.
        name: String,
    },

    /// The store could not answer.
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Creates a [`StoreError::NotFound`] for a secret.
    pub fn secret_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "secret".to_string(),
            name: name.into(),
        }
    }

    /// Returns true if the object does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Read access to the objects this crate depends on.
///
/// Calls may block on I/O; no timeout is imposed here.
pub trait ResourceStore {
    /// Reads the payload of a secret.
    fn get_secret(&self, namespace: &str, name: &str) -> StoreResult<SecretData>;

    /// Returns the identifier of the live cluster object, used for owner
    /// references.
    fn get_cluster_uid(&self, namespace: &str, name: &str) -> StoreResult<String>;
}

impl<S: ResourceStore + ?Sized> ResourceStore for &S {
    fn get_secret(&self, namespace: &str, name: &str) -> StoreResult<SecretData> {
        (**self).get_secret(namespace, name)
    }

    fn get_cluster_uid(&self, namespace: &str, name: &str) -> StoreResult<String> {
        (**self).get_cluster_uid(namespace, name)
    }
}

type ObjectKey = (String, String);

fn key(namespace: &str, name: &str) -> ObjectKey {
    (namespace.to_string(), name.to_string())
}

/// In-memory resource store.
///
/// Failures can be injected per secret to simulate a misbehaving backend,
/// and every secret lookup is recorded.
#[derive(Default)]
pub struct MemoryStore {
    secrets: RwLock<HashMap<ObjectKey, SecretData>>,
    clusters: RwLock<HashMap<ObjectKey, String>>,
    failures: RwLock<HashMap<ObjectKey, String>>,
    lookups: RwLock<Vec<ObjectKey>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a secret, replacing any previous payload.
    pub fn put_secret(&self, namespace: &str, name: &str, data: SecretData) {
        debug!(namespace, name, "storing secret");
        self.secrets
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key(namespace, name), data);
    }

    /// Removes a secret. Returns true if it existed.
    pub fn remove_secret(&self, namespace: &str, name: &str) -> bool {
        self.secrets
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&key(namespace, name))
            .is_some()
    }

    /// Registers a live cluster object.
    pub fn put_cluster(&self, namespace: &str, name: &str, uid: impl Into<String>) {
        self.clusters
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key(namespace, name), uid.into());
    }

    /// Removes a cluster object. Returns true if it existed.
    pub fn remove_cluster(&self, namespace: &str, name: &str) -> bool {
        self.clusters
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&key(namespace, name))
            .is_some()
    }

    /// Makes every lookup of the given secret fail with a backend error.
    pub fn fail_secret(&self, namespace: &str, name: &str, reason: impl Into<String>) {
        self.failures
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key(namespace, name), reason.into());
    }

    /// Returns the names of all secrets looked up so far, in order.
    #[must_use]
    pub fn secret_lookups(&self) -> Vec<String> {
        self.lookups
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Returns the number of stored secrets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.secrets
            .read()
            .map(|s| s.len())
            .unwrap_or(0)
    }

    /// Returns true if no secrets are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResourceStore for MemoryStore {
    fn get_secret(&self, namespace: &str, name: &str) -> StoreResult<SecretData> {
        let object = key(namespace, name);
        self.lookups
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(object.clone());

        let failures = self
            .failures
            .read()
            .map_err(|e| StoreError::Backend(format!("failed to acquire read lock: {e}")))?;
        if let Some(reason) = failures.get(&object) {
            return Err(StoreError::Backend(reason.clone()));
        }

        let secrets = self
            .secrets
            .read()
            .map_err(|e| StoreError::Backend(format!("failed to acquire read lock: {e}")))?;
        secrets
            .get(&object)
            .cloned()
            .ok_or_else(|| StoreError::secret_not_found(name))
    }

    fn get_cluster_uid(&self, namespace: &str, name: &str) -> StoreResult<String> {
        let clusters = self
            .clusters
            .read()
            .map_err(|e| StoreError::Backend(format!("failed to acquire read lock: {e}")))?;
        clusters
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: "cluster".to_string(),
                name: name.to_string(),
            })
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("secrets", &self.len())
            .finish()
    }
}
