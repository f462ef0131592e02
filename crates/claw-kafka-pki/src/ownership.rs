//! Owner references for emitted resources.
//!
//! Every resource emitted for a cluster is controlled by that cluster so the
//! platform deletes it together with the cluster. Binding is all-or-nothing.

use tracing::debug;

use crate::bootstrap::BootstrapBundle;
use crate::config::PkiConfig;
use crate::error::{Error, Result};
use crate::resources::{OwnerReference, Owned};
use crate::store::ResourceStore;
use crate::types::ClusterIdentity;

/// Attaches controller owner references to resources.
pub struct OwnershipBinder<'a, S> {
    store: &'a S,
    config: &'a PkiConfig,
}

impl<'a, S: ResourceStore> OwnershipBinder<'a, S> {
    /// Creates a binder resolving owners through `store`.
    #[must_use]
    pub const fn new(store: &'a S, config: &'a PkiConfig) -> Self {
        Self { store, config }
    }

    /// Resolves the controller reference for `owner`.
    ///
    /// # Errors
    ///
    /// - [`Error::NotReady`] if the cluster object does not exist.
    /// - [`Error::UpstreamFailure`] if the store lookup fails.
    /// - [`Error::Configuration`] if the declared identity names a different
    ///   object than the one stored.
    pub fn owner_reference(&self, owner: &ClusterIdentity) -> Result<OwnerReference> {
        let uid = self
            .store
            .get_cluster_uid(&owner.namespace, &owner.name)
            .map_err(|e| Error::from_store(&owner.name, e))?;

        if !owner.uid.is_empty() && owner.uid != uid {
            return Err(Error::configuration(
                &owner.name,
                format!("declared uid {} does not match stored uid {uid}", owner.uid),
            ));
        }

        Ok(OwnerReference {
            api_version: self.config.owner.api_version.clone(),
            kind: self.config.owner.kind.clone(),
            name: owner.name.clone(),
            uid,
            controller: true,
            block_owner_deletion: true,
        })
    }

    /// Makes `owner` the controller of every resource.
    ///
    /// Binding a resource already controlled by the same owner is a no-op.
    ///
    /// # Errors
    ///
    /// Fails as [`Self::owner_reference`] does, or with
    /// [`Error::Configuration`] if a resource is already controlled by another
    /// owner. No resources are returned on failure.
    pub fn bind<T: Owned>(&self, owner: &ClusterIdentity, mut resources: Vec<T>) -> Result<Vec<T>> {
        let reference = self.owner_reference(owner)?;
        for resource in &mut resources {
            attach(resource, &reference)?;
        }
        debug!(owner = %owner.name, count = resources.len(), "bound resources to owner");
        Ok(resources)
    }

    /// Makes `owner` the controller of both records of a bootstrap bundle.
    ///
    /// # Errors
    ///
    /// See [`Self::bind`].
    pub fn bind_bundle(&self, owner: &ClusterIdentity, mut bundle: BootstrapBundle) -> Result<BootstrapBundle> {
        let reference = self.owner_reference(owner)?;
        attach(&mut bundle.credentials, &reference)?;
        attach(&mut bundle.passphrase, &reference)?;
        Ok(bundle)
    }
}

fn attach<T: Owned>(resource: &mut T, reference: &OwnerReference) -> Result<()> {
    let meta = resource.metadata_mut();
    if let Some(existing) = meta.controller() {
        if existing.uid == reference.uid {
            return Ok(());
        }
        return Err(Error::configuration(
            &meta.name,
            format!(
                "already controlled by {} {} ({})",
                existing.kind, existing.name, existing.uid
            ),
        ));
    }
    meta.owner_references.push(reference.clone());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::self_issued_topology;
    use crate::resources::SecurityResource;
    use crate::store::MemoryStore;

    fn setup() -> (MemoryStore, PkiConfig, ClusterIdentity) {
        let store = MemoryStore::new();
        store.put_cluster("prod", "kafka", "uid-1");
        let identity = ClusterIdentity::new("kafka", "prod").with_brokers([0]);
        (store, PkiConfig::default(), identity)
    }

    fn planned(config: &PkiConfig, identity: &ClusterIdentity) -> Vec<SecurityResource> {
        self_issued_topology(config, identity)
    }

    #[test]
    fn binds_every_resource() {
        let (store, config, identity) = setup();
        let bound = OwnershipBinder::new(&store, &config)
            .bind(&identity, planned(&config, &identity))
            .expect("bind");

        assert_eq!(bound.len(), 5);
        for resource in &bound {
            let refs = &resource.metadata().owner_references;
            assert_eq!(refs.len(), 1);
            assert_eq!(refs[0].uid, "uid-1");
            assert_eq!(refs[0].kind, "KafkaCluster");
            assert_eq!(refs[0].name, "kafka");
            assert!(refs[0].controller);
            assert!(refs[0].block_owner_deletion);
        }
    }

    #[test]
    fn rebinding_same_owner_is_idempotent() {
        let (store, config, identity) = setup();
        let binder = OwnershipBinder::new(&store, &config);
        let once = binder.bind(&identity, planned(&config, &identity)).expect("bind");
        let twice = binder.bind(&identity, once.clone()).expect("bind");
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_owner_discards_batch() {
        let (store, config, identity) = setup();
        store.remove_cluster("prod", "kafka");
        let err = OwnershipBinder::new(&store, &config)
            .bind(&identity, planned(&config, &identity))
            .expect_err("owner gone");
        assert!(matches!(err, Error::NotReady { .. }));
        assert_eq!(err.resource(), "kafka");
    }

    #[test]
    fn uid_mismatch_is_configuration_error() {
        let (store, config, identity) = setup();
        let identity = identity.with_uid("uid-stale");
        let err = OwnershipBinder::new(&store, &config)
            .bind(&identity, planned(&config, &identity))
            .expect_err("mismatch");
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn foreign_controller_fails_whole_batch() {
        let (store, config, identity) = setup();
        let mut resources = planned(&config, &identity);
        resources[3].metadata_mut().owner_references.push(OwnerReference {
            api_version: "v1".to_string(),
            kind: "KafkaCluster".to_string(),
            name: "other".to_string(),
            uid: "uid-2".to_string(),
            controller: true,
            block_owner_deletion: true,
        });

        let err = OwnershipBinder::new(&store, &config)
            .bind(&identity, resources)
            .expect_err("conflict");
        assert_eq!(err.resource(), "kafka-server-certificate");
        assert!(!err.is_retryable());
    }

    #[test]
    fn empty_batch_still_requires_owner() {
        let (store, config, identity) = setup();
        let binder = OwnershipBinder::new(&store, &config);
        assert!(binder.bind::<SecurityResource>(&identity, Vec::new()).expect("bind").is_empty());

        store.remove_cluster("prod", "kafka");
        assert!(binder.bind::<SecurityResource>(&identity, Vec::new()).is_err());
    }
}
