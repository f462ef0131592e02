//! Declarative security-resource descriptors.
//!
//! These describe issuers, certificate requests and secrets for the caller to
//! apply. Nothing here holds real key material except the republished anchor
//! secret, whose bytes are copied from the operator-supplied CA.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::SecretData;

/// Kind of every issuer emitted here; issuers are cluster-scoped.
pub const CLUSTER_ISSUER_KIND: &str = "ClusterIssuer";

/// A cascade-deletion back-reference to the owning cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerReference {
    /// API version of the owner.
    pub api_version: String,
    /// Kind of the owner.
    pub kind: String,
    /// Name of the owner.
    pub name: String,
    /// Identifier of the live owner object.
    pub uid: String,
    /// The owner is the managing controller.
    pub controller: bool,
    /// Deletion of the owner waits for this object.
    pub block_owner_deletion: bool,
}

/// Object metadata carried by every descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Object name.
    pub name: String,
    /// Namespace, `None` for cluster-scoped objects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Owner references.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owner_references: Vec<OwnerReference>,
}

impl ObjectMeta {
    /// Metadata for a namespaced object.
    #[must_use]
    pub fn namespaced(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
            ..Self::default()
        }
    }

    /// Metadata for a cluster-scoped object.
    #[must_use]
    pub fn cluster_scoped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Replaces the labels.
    #[must_use]
    pub fn with_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    /// Returns the managing controller reference, if any.
    #[must_use]
    pub fn controller(&self) -> Option<&OwnerReference> {
        self.owner_references.iter().find(|r| r.controller)
    }
}

/// Anything carrying [`ObjectMeta`] that can be bound to an owner.
pub trait Owned {
    /// Returns the object's metadata.
    fn metadata(&self) -> &ObjectMeta;

    /// Returns the object's metadata for modification.
    fn metadata_mut(&mut self) -> &mut ObjectMeta;
}

/// How an issuer signs requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IssuerSpec {
    /// Signs with the requested certificate's own key.
    SelfSigned {},
    /// Signs with the CA key pair stored in `secret_name`.
    Ca {
        /// Secret holding the CA key pair.
        #[serde(rename = "secretName")]
        secret_name: String,
    },
}

/// A signing authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerDescriptor {
    /// Metadata.
    pub metadata: ObjectMeta,
    /// Signing mode.
    pub spec: IssuerSpec,
}

impl IssuerDescriptor {
    /// Secret anchoring a CA-backed issuer.
    #[must_use]
    pub fn anchor_secret(&self) -> Option<&str> {
        match &self.spec {
            IssuerSpec::Ca { secret_name } => Some(secret_name),
            IssuerSpec::SelfSigned {} => None,
        }
    }
}

/// Private key encoding requested from the issuer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEncoding {
    /// PKCS#1.
    #[serde(rename = "pkcs1")]
    Pkcs1,
    /// PKCS#8.
    #[serde(rename = "pkcs8")]
    Pkcs8,
}

/// Reference from a certificate to its issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerRef {
    /// Issuer name.
    pub name: String,
    /// Issuer kind.
    pub kind: String,
}

impl IssuerRef {
    /// References a cluster-scoped issuer.
    #[must_use]
    pub fn cluster_issuer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CLUSTER_ISSUER_KIND.to_string(),
        }
    }
}

/// A certificate request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSpec {
    /// Secret the issued key pair is written to.
    pub secret_name: String,
    /// Subject common name.
    pub common_name: String,
    /// DNS alternative names, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_names: Vec<String>,
    /// The certificate is a CA.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_ca: bool,
    /// Requested private key encoding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_encoding: Option<KeyEncoding>,
    /// Signing issuer.
    pub issuer_ref: IssuerRef,
}

/// A certificate descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateDescriptor {
    /// Metadata.
    pub metadata: ObjectMeta,
    /// Request details.
    pub spec: CertificateSpec,
}

/// A secret descriptor carrying its payload.
///
/// The planner emits one of these to republish an externally supplied CA
/// under the keys the cluster issuer expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretDescriptor {
    /// Metadata.
    pub metadata: ObjectMeta,
    /// Byte-keyed payload.
    pub data: SecretData,
}

/// One security resource to be applied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SecurityResource {
    /// A cluster issuer.
    #[serde(rename = "ClusterIssuer")]
    Issuer(IssuerDescriptor),
    /// A certificate request.
    Certificate(CertificateDescriptor),
    /// A secret.
    Secret(SecretDescriptor),
}

impl SecurityResource {
    /// Returns the resource kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Issuer(_) => CLUSTER_ISSUER_KIND,
            Self::Certificate(_) => "Certificate",
            Self::Secret(_) => "Secret",
        }
    }

    /// Returns the resource name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata().name
    }

    /// Returns the issuer descriptor, if this is one.
    #[must_use]
    pub const fn as_issuer(&self) -> Option<&IssuerDescriptor> {
        match self {
            Self::Issuer(issuer) => Some(issuer),
            _ => None,
        }
    }

    /// Returns the certificate descriptor, if this is one.
    #[must_use]
    pub const fn as_certificate(&self) -> Option<&CertificateDescriptor> {
        match self {
            Self::Certificate(cert) => Some(cert),
            _ => None,
        }
    }

    /// Returns the secret descriptor, if this is one.
    #[must_use]
    pub const fn as_secret(&self) -> Option<&SecretDescriptor> {
        match self {
            Self::Secret(secret) => Some(secret),
            _ => None,
        }
    }
}

impl Owned for SecurityResource {
    fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::Issuer(r) => &r.metadata,
            Self::Certificate(r) => &r.metadata,
            Self::Secret(r) => &r.metadata,
        }
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        match self {
            Self::Issuer(r) => &mut r.metadata,
            Self::Certificate(r) => &mut r.metadata,
            Self::Secret(r) => &mut r.metadata,
        }
    }
}

impl From<IssuerDescriptor> for SecurityResource {
    fn from(issuer: IssuerDescriptor) -> Self {
        Self::Issuer(issuer)
    }
}

impl From<CertificateDescriptor> for SecurityResource {
    fn from(cert: CertificateDescriptor) -> Self {
        Self::Certificate(cert)
    }
}

impl From<SecretDescriptor> for SecurityResource {
    fn from(secret: SecretDescriptor) -> Self {
        Self::Secret(secret)
    }
}
