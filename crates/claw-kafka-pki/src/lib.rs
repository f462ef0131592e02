//! Transport-security planning for Kafka clusters on Clawbernetes.
#![forbid(unsafe_code)]
//!
//! This crate decides which certificate-trust resources a Kafka cluster needs
//! and assembles the issued credentials into the bootstrap bundle a broker
//! loads for mutual TLS. It never signs, generates keys, persists or retries:
//! the caller applies the returned descriptors and re-invokes on failure.
//!
//! # Overview
//!
//! - [`TopologyPlanner`] chooses between a self-issued chain and an
//!   operator-supplied trust anchor and emits the resources in application order
//! - [`OwnershipBinder`] makes the cluster the controller of every resource
//! - [`BootstrapAssembler`] merges the issued server and controller key pairs
//! - [`dns`] derives the broker certificate's subject and DNS names
//!
//! # Example
//!
//! ```
//! use claw_kafka_pki::{desired_resources, ClusterIdentity, MemoryStore, PkiConfig};
//!
//! let store = MemoryStore::new();
//! store.put_cluster("prod", "kafka", "3f2c");
//!
//! let identity = ClusterIdentity::new("kafka", "prod").with_brokers([0, 1, 2]);
//! let resources = desired_resources(&store, &PkiConfig::default(), &identity).unwrap();
//!
//! assert_eq!(resources.len(), 5);
//! assert_eq!(resources[0].name(), "kafka-self-signer");
//! ```
//!
//! # Modules
//!
//! - [`planner`] - Provisioning mode selection and resource emission
//! - [`ownership`] - Owner references
//! - [`bootstrap`] - Bootstrap credential assembly
//! - [`dns`] - Subject and DNS name derivation
//! - [`naming`] - Resource naming templates
//! - [`resources`] - Descriptor types
//! - [`store`] - Resource store access
//! - [`config`] - Configuration
//! - [`types`] - Cluster identity and secret payloads
//! - [`error`] - Error types

pub mod bootstrap;
pub mod config;
pub mod dns;
pub mod error;
pub mod keys;
pub mod naming;
pub mod ownership;
pub mod planner;
pub mod resources;
pub mod store;
pub mod types;


// Re-export commonly used types at crate root
pub use bootstrap::{
    BootstrapAssembler, BootstrapBundle, BootstrapCredentialSet, PassphraseRecord,
    PASSPHRASE_LENGTH,
};
pub use config::{OwnerKind, PkiConfig};
pub use error::{Error, Result};
pub use naming::NamingPolicy;
pub use ownership::OwnershipBinder;
pub use planner::{external_anchor_topology, self_issued_topology, ProvisioningMode, TopologyPlanner};
pub use resources::{
    CertificateDescriptor, IssuerDescriptor, ObjectMeta, OwnerReference, Owned, SecretDescriptor,
    SecurityResource,
};
pub use store::{MemoryStore, ResourceStore, StoreError};
pub use types::{BrokerId, ClusterIdentity, SecretBytes, SecretData, TlsConfig};

/// Plans the cluster's security resources and binds them to the cluster.
///
/// The result is in application order. Either every resource is returned,
/// owned by the cluster, or none is.
///
/// # Errors
///
/// Any error from [`TopologyPlanner::plan`] or [`OwnershipBinder::bind`].
pub fn desired_resources<S: ResourceStore>(
    store: &S,
    config: &PkiConfig,
    identity: &ClusterIdentity,
) -> Result<Vec<SecurityResource>> {
    let resources = TopologyPlanner::new(store, config).plan(identity)?;
    OwnershipBinder::new(store, config).bind(identity, resources)
}
