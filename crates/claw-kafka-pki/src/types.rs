//! Core types: the declared cluster identity and byte-keyed secret payloads.
//!
//! - [`ClusterIdentity`]: immutable per-pass input describing a Kafka cluster
//! - [`TlsConfig`]: how the cluster's trust chain is provisioned
//! - [`SecretBytes`]: key material that zeroizes on drop
//! - [`SecretData`]: an ordered, byte-keyed secret payload

use std::collections::BTreeMap;
use std::fmt;

use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Identifier of a single broker within a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrokerId(i32);

impl BrokerId {
    /// Creates a broker identifier.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Returns the numeric identifier.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl From<i32> for BrokerId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl fmt::Display for BrokerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// TLS provisioning settings declared on a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TlsConfig {
    /// Issue our own root authority instead of importing one.
    pub create_own_trust: bool,
    /// Secret holding an externally supplied CA key and certificate.
    pub external_secret_name: Option<String>,
    /// Name of the bootstrap credential secret handed to brokers.
    pub bootstrap_secret_name: String,
    /// Name of the keystore passphrase secret.
    pub passphrase_secret_name: String,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            create_own_trust: true,
            external_secret_name: None,
            bootstrap_secret_name: String::new(),
            passphrase_secret_name: String::new(),
        }
    }
}

impl TlsConfig {
    /// Settings for a cluster that issues its own trust chain.
    #[must_use]
    pub fn self_issued() -> Self {
        Self::default()
    }

    /// Settings for a cluster anchored on an externally supplied CA secret.
    #[must_use]
    pub fn external(secret_name: impl Into<String>) -> Self {
        Self {
            create_own_trust: false,
            external_secret_name: Some(secret_name.into()),
            ..Self::default()
        }
    }

    /// Sets the bootstrap and passphrase secret names.
    #[must_use]
    pub fn with_bootstrap_secrets(
        mut self,
        bootstrap: impl Into<String>,
        passphrase: impl Into<String>,
    ) -> Self {
        self.bootstrap_secret_name = bootstrap.into();
        self.passphrase_secret_name = passphrase.into();
        self
    }
}

/// The declared identity and topology of a Kafka cluster.
///
/// Supplied by the caller on every reconciliation pass and never mutated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterIdentity {
    /// Cluster name; every derived resource name is a function of it.
    pub name: String,
    /// Namespace the cluster lives in.
    pub namespace: String,
    /// Identifier of the live cluster object, empty until it has been stored.
    #[serde(default)]
    pub uid: String,
    /// Brokers in topology order.
    #[serde(default)]
    pub brokers: Vec<BrokerId>,
    /// Brokers are addressed through a headless service.
    #[serde(default)]
    pub headless: bool,
    /// TLS provisioning settings.
    #[serde(default)]
    pub tls: TlsConfig,
}

impl ClusterIdentity {
    /// Creates an identity with no brokers and a self-issued trust chain.
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            uid: String::new(),
            brokers: Vec::new(),
            headless: false,
            tls: TlsConfig::default(),
        }
    }

    /// Sets the live object identifier.
    #[must_use]
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    /// Sets the broker list, preserving order.
    #[must_use]
    pub fn with_brokers(mut self, brokers: impl IntoIterator<Item = i32>) -> Self {
        self.brokers = brokers.into_iter().map(BrokerId::new).collect();
        self
    }

    /// Sets the headless-topology flag.
    #[must_use]
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Sets the TLS provisioning settings.
    #[must_use]
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }
}

/// Secret key or certificate bytes that are cleared from memory on drop.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes {
    data: Vec<u8>,
}

impl SecretBytes {
    /// Wraps raw bytes.
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Returns the bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the number of bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if there are no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Vec<u8>> for SecretBytes {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for SecretBytes {
    fn from(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }
}

impl From<&str> for SecretBytes {
    fn from(data: &str) -> Self {
        Self::new(data.as_bytes().to_vec())
    }
}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretBytes")
            .field("len", &self.data.len())
            .field("data", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for SecretBytes {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        self.data.ct_eq(&other.data).into()
    }
}

impl Eq for SecretBytes {}

impl Serialize for SecretBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(&self.data))
    }
}

impl<'de> Deserialize<'de> for SecretBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map(Self::new)
            .map_err(serde::de::Error::custom)
    }
}

/// A byte-keyed secret payload, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretData(BTreeMap<String, SecretBytes>);

impl SecretData {
    /// Creates an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry and returns the payload.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<SecretBytes>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SecretBytes>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the entry for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SecretBytes> {
        self.0.get(key)
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterates over keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_deserializes_with_defaults() {
        let json = r#"{"name": "kafka", "namespace": "prod", "brokers": [0, 1, 2]}"#;
        let identity: ClusterIdentity = serde_json::from_str(json).expect("deserialize");
        assert_eq!(identity.name, "kafka");
        assert_eq!(identity.brokers, vec![BrokerId::new(0), BrokerId::new(1), BrokerId::new(2)]);
        assert!(!identity.headless);
        assert!(identity.tls.create_own_trust);
        assert!(identity.uid.is_empty());
    }

    #[test]
    fn identity_deserializes_external_tls() {
        let json = r#"{
            "name": "kafka",
            "namespace": "prod",
            "headless": true,
            "tls": {
                "createOwnTrust": false,
                "externalSecretName": "my-ca",
                "bootstrapSecretName": "kafka-tls",
                "passphraseSecretName": "kafka-jks"
            }
        }"#;
        let identity: ClusterIdentity = serde_json::from_str(json).expect("deserialize");
        assert!(identity.headless);
        assert_eq!(
            identity.tls,
            TlsConfig::external("my-ca").with_bootstrap_secrets("kafka-tls", "kafka-jks")
        );
    }

    #[test]
    fn builder_preserves_broker_order() {
        let identity = ClusterIdentity::new("kafka", "prod").with_brokers([3, 1, 2]);
        let ids: Vec<i32> = identity.brokers.iter().map(|b| b.get()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn secret_bytes_debug_redacts_data() {
        let value = SecretBytes::from("super-secret");
        let debug_str = format!("{value:?}");
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("super-secret"));
    }

    #[test]
    fn secret_bytes_serialize_as_base64() {
        let value = SecretBytes::from("abc");
        let json = serde_json::to_string(&value).expect("serialize");
        assert_eq!(json, r#""YWJj""#);
        let restored: SecretBytes = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, value);
    }

    #[test]
    fn secret_bytes_rejects_invalid_base64() {
        let result: std::result::Result<SecretBytes, _> = serde_json::from_str(r#""not base64!""#);
        assert!(result.is_err());
    }

    #[test]
    fn secret_data_keys_are_ordered() {
        let data = SecretData::new()
            .with("tls.key", "k")
            .with("ca.crt", "c")
            .with("tls.crt", "t");
        let keys: Vec<&str> = data.keys().collect();
        assert_eq!(keys, vec!["ca.crt", "tls.crt", "tls.key"]);
        assert_eq!(data.len(), 3);
        assert_eq!(data.get("ca.crt").map(SecretBytes::as_bytes), Some(&b"c"[..]));
    }
}
