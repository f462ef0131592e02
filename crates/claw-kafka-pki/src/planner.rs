//! Certificate-trust topology planning.
//!
//! The trust chain always has two tiers: a root authority (self-signed, or
//! imported from an operator-supplied secret) and a single CA-backed cluster
//! issuer that signs every leaf certificate.
//!
//! [`ProvisioningMode`] is resolved once from the cluster's TLS settings; each
//! mode is planned by its own function so either can be exercised on its own.

use tracing::{debug, info, warn};

use crate::config::PkiConfig;
use crate::dns;
use crate::error::{Error, Result};
use crate::keys;
use crate::resources::{
    CertificateDescriptor, CertificateSpec, IssuerDescriptor, IssuerRef, IssuerSpec, KeyEncoding,
    ObjectMeta, SecretDescriptor, SecurityResource,
};
use crate::store::ResourceStore;
use crate::types::{ClusterIdentity, SecretData};

/// How the cluster's root authority is provisioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningMode {
    /// Issue a self-signed root and the full chain below it.
    SelfIssued,
    /// Import the root from an operator-supplied secret.
    ExternalAnchor {
        /// Secret holding the CA key and certificate.
        secret_name: String,
    },
}

impl ProvisioningMode {
    /// Resolves the mode declared by `identity`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if external anchoring is selected
    /// without naming a secret.
    pub fn for_identity(identity: &ClusterIdentity) -> Result<Self> {
        if identity.tls.create_own_trust {
            return Ok(Self::SelfIssued);
        }
        match identity.tls.external_secret_name.as_deref() {
            Some(name) if !name.is_empty() => Ok(Self::ExternalAnchor {
                secret_name: name.to_string(),
            }),
            _ => Err(Error::configuration(
                &identity.name,
                "externally anchored trust selected but no external secret name is configured",
            )),
        }
    }
}

/// Plans the security resources a cluster needs.
pub struct TopologyPlanner<'a, S> {
    store: &'a S,
    config: &'a PkiConfig,
}

impl<'a, S: ResourceStore> TopologyPlanner<'a, S> {
    /// Creates a planner reading from `store`.
    #[must_use]
    pub const fn new(store: &'a S, config: &'a PkiConfig) -> Self {
        Self { store, config }
    }

    /// Returns the resources to apply, in application order.
    ///
    /// The returned descriptors carry no owner references yet; see
    /// [`crate::OwnershipBinder`].
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] if the TLS settings are contradictory or the
    ///   supplied anchor secret lacks a CA key or certificate.
    /// - [`Error::NotReady`] if the supplied anchor secret does not exist yet.
    /// - [`Error::UpstreamFailure`] if the store lookup fails.
    pub fn plan(&self, identity: &ClusterIdentity) -> Result<Vec<SecurityResource>> {
        let mode = ProvisioningMode::for_identity(identity)?;
        info!(cluster = %identity.name, namespace = %identity.namespace, ?mode, "planning PKI");

        let resources = match mode {
            ProvisioningMode::SelfIssued => self_issued_topology(self.config, identity),
            ProvisioningMode::ExternalAnchor { secret_name } => {
                let anchor = self
                    .store
                    .get_secret(&identity.namespace, &secret_name)
                    .map_err(|e| {
                        let err = Error::from_store(&secret_name, e);
                        warn!(cluster = %identity.name, error = %err, "trust anchor unavailable");
                        err
                    })?;
                external_anchor_topology(self.config, identity, &secret_name, &anchor)?
            }
        };

        for resource in &resources {
            debug!(kind = resource.kind(), name = resource.name(), "planned resource");
        }
        Ok(resources)
    }
}

/// Plans a self-issued chain.
///
/// Returns, in order: the self-signed issuer, the root CA certificate, the
/// cluster issuer backed by it, the broker server certificate and the
/// controller client certificate.
#[must_use]
pub fn self_issued_topology(
    config: &PkiConfig,
    identity: &ClusterIdentity,
) -> Vec<SecurityResource> {
    let naming = &config.naming;
    let cluster = &identity.name;
    let labels = config.labels(cluster);

    let self_signer_name = naming.self_signer(cluster);
    let root_name = naming.root_authority(cluster);
    let issuer_name = naming.cluster_issuer(cluster);
    let server_name = naming.server_certificate(cluster);
    let controller_name = naming.controller_certificate(cluster);

    let self_signer = IssuerDescriptor {
        metadata: ObjectMeta::cluster_scoped(&self_signer_name).with_labels(labels.clone()),
        spec: IssuerSpec::SelfSigned {},
    };

    // The cluster issuer reads its CA secret from the cluster-resource namespace.
    let root = CertificateDescriptor {
        metadata: ObjectMeta::namespaced(&root_name, &config.cluster_resource_namespace)
            .with_labels(labels.clone()),
        spec: CertificateSpec {
            secret_name: root_name.clone(),
            common_name: format!("kafkaca.{}.cluster.local", identity.namespace),
            dns_names: Vec::new(),
            is_ca: true,
            key_encoding: None,
            issuer_ref: IssuerRef::cluster_issuer(self_signer_name),
        },
    };

    let issuer = cluster_issuer(config, identity, root_name);

    let server = CertificateDescriptor {
        metadata: ObjectMeta::namespaced(&server_name, &identity.namespace)
            .with_labels(labels.clone()),
        spec: CertificateSpec {
            secret_name: server_name,
            common_name: dns::common_name(naming, identity),
            dns_names: dns::dns_names(naming, identity),
            is_ca: false,
            key_encoding: Some(KeyEncoding::Pkcs8),
            issuer_ref: IssuerRef::cluster_issuer(&issuer_name),
        },
    };

    let controller = CertificateDescriptor {
        metadata: ObjectMeta::namespaced(&controller_name, &identity.namespace)
            .with_labels(labels),
        spec: CertificateSpec {
            secret_name: controller_name,
            common_name: format!("{cluster}-controller"),
            dns_names: Vec::new(),
            is_ca: false,
            key_encoding: Some(KeyEncoding::Pkcs8),
            issuer_ref: IssuerRef::cluster_issuer(issuer_name),
        },
    };

    vec![
        self_signer.into(),
        root.into(),
        issuer.into(),
        server.into(),
        controller.into(),
    ]
}

/// Plans a chain anchored on an operator-supplied CA.
///
/// `anchor` is the payload of the secret named `anchor_name`. Its key and
/// certificate are republished verbatim under the conventional TLS keys,
/// followed by the cluster issuer backed by the republished secret.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if the anchor lacks the CA key or
/// certificate.
pub fn external_anchor_topology(
    config: &PkiConfig,
    identity: &ClusterIdentity,
    anchor_name: &str,
    anchor: &SecretData,
) -> Result<Vec<SecurityResource>> {
    let require = |key: &str| {
        anchor.get(key).cloned().ok_or_else(|| {
            Error::configuration(anchor_name, format!("trust anchor secret has no {key} entry"))
        })
    };
    let ca_key = require(keys::CA_PRIVATE_KEY)?;
    let ca_cert = require(keys::CA_CERT)?;

    let root_name = config.naming.root_authority(&identity.name);
    let republished = SecretDescriptor {
        metadata: ObjectMeta::namespaced(&root_name, &config.cluster_resource_namespace)
            .with_labels(config.labels(&identity.name)),
        data: SecretData::new()
            .with(keys::CORE_CA_CERT, ca_cert.clone())
            .with(keys::TLS_CERT, ca_cert)
            .with(keys::TLS_PRIVATE_KEY, ca_key),
    };

    let issuer = cluster_issuer(config, identity, root_name);
    Ok(vec![republished.into(), issuer.into()])
}

fn cluster_issuer(
    config: &PkiConfig,
    identity: &ClusterIdentity,
    anchor_secret: String,
) -> IssuerDescriptor {
    IssuerDescriptor {
        metadata: ObjectMeta::cluster_scoped(config.naming.cluster_issuer(&identity.name))
            .with_labels(config.labels(&identity.name)),
        spec: IssuerSpec::Ca {
            secret_name: anchor_secret,
        },
    }
}
