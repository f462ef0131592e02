//! PKI error types.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for PKI operations.
pub type Result<T> = std::result::Result<T, Error>;

/// PKI error variants.
///
/// Every variant names the resource that was being resolved when the failure
/// happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A dependency does not exist yet. Re-invoke on a later pass.
    #[error("resource not ready: {resource}: {reason}")]
    NotReady {
        /// Name of the resource being resolved.
        resource: String,
        /// What was missing.
        reason: String,
    },

    /// The resource store returned an unexpected error.
    #[error("upstream failure resolving {resource}: {reason}")]
    UpstreamFailure {
        /// Name of the resource being resolved.
        resource: String,
        /// The store's error message.
        reason: String,
    },

    /// The declared cluster identity or configuration is self-contradictory.
    #[error("configuration error for {resource}: {reason}")]
    Configuration {
        /// Name of the resource being resolved.
        resource: String,
        /// What needs to be corrected.
        reason: String,
    },
}

impl Error {
    /// Creates a [`Error::NotReady`].
    pub fn not_ready(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotReady {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// Creates a [`Error::UpstreamFailure`].
    pub fn upstream(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UpstreamFailure {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// Creates a [`Error::Configuration`].
    pub fn configuration(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// Maps a store lookup failure for `resource` onto the PKI taxonomy.
    ///
    /// A missing object becomes [`Error::NotReady`], anything else
    /// [`Error::UpstreamFailure`].
    pub fn from_store(resource: impl Into<String>, err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, .. } => {
                Self::not_ready(resource, format!("{kind} not found"))
            }
            StoreError::Backend(reason) => Self::upstream(resource, reason),
        }
    }

    /// Returns the name of the resource the failure refers to.
    #[must_use]
    pub fn resource(&self) -> &str {
        match self {
            Self::NotReady { resource, .. }
            | Self::UpstreamFailure { resource, .. }
            | Self::Configuration { resource, .. } => resource,
        }
    }

    /// Whether re-invoking later may succeed without operator intervention.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::NotReady { .. } | Self::UpstreamFailure { .. })
    }
}
