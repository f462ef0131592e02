//! Bootstrap credential assembly.
//!
//! Once the issuance controller has written the server and controller
//! certificates, their key pairs are merged into the single credential set a
//! broker loads at startup, together with a keystore passphrase.

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{info, warn};

use crate::config::PkiConfig;
use crate::error::{Error, Result};
use crate::keys;
use crate::resources::{ObjectMeta, Owned, SecretDescriptor};
use crate::store::ResourceStore;
use crate::types::{ClusterIdentity, SecretBytes, SecretData};

/// Length in bytes of a generated keystore passphrase.
pub const PASSPHRASE_LENGTH: usize = 16;

/// Everything a broker needs for mutual TLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapCredentialSet {
    /// Target secret metadata.
    pub metadata: ObjectMeta,
    /// CA certificate.
    pub ca_cert: SecretBytes,
    /// Broker peer certificate.
    pub peer_cert: SecretBytes,
    /// Broker peer private key.
    pub peer_key: SecretBytes,
    /// Client certificate.
    pub client_cert: SecretBytes,
    /// Client private key.
    pub client_key: SecretBytes,
}

impl BootstrapCredentialSet {
    /// Returns the byte-keyed payload under the keystore tooling's key names.
    #[must_use]
    pub fn data(&self) -> SecretData {
        SecretData::new()
            .with(keys::CA_CERT, self.ca_cert.clone())
            .with(keys::PEER_CERT, self.peer_cert.clone())
            .with(keys::PEER_PRIVATE_KEY, self.peer_key.clone())
            .with(keys::CLIENT_CERT, self.client_cert.clone())
            .with(keys::CLIENT_PRIVATE_KEY, self.client_key.clone())
    }

    /// Returns the secret to persist.
    #[must_use]
    pub fn to_secret(&self) -> SecretDescriptor {
        SecretDescriptor {
            metadata: self.metadata.clone(),
            data: self.data(),
        }
    }
}

/// A keystore passphrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassphraseRecord {
    /// Target secret metadata.
    pub metadata: ObjectMeta,
    /// The passphrase.
    pub passphrase: SecretBytes,
}

impl PassphraseRecord {
    /// Creates a record holding a fresh random passphrase.
    #[must_use]
    pub fn generate(metadata: ObjectMeta) -> Self {
        let passphrase: Vec<u8> = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(PASSPHRASE_LENGTH)
            .collect();
        Self {
            metadata,
            passphrase: SecretBytes::new(passphrase),
        }
    }

    /// Returns the secret to persist.
    #[must_use]
    pub fn to_secret(&self) -> SecretDescriptor {
        SecretDescriptor {
            metadata: self.metadata.clone(),
            data: SecretData::new().with(keys::PASSWORD, self.passphrase.clone()),
        }
    }
}

impl Owned for BootstrapCredentialSet {
    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

impl Owned for PassphraseRecord {
    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

/// Result of a successful assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapBundle {
    /// Merged credentials.
    pub credentials: BootstrapCredentialSet,
    /// Freshly generated passphrase.
    pub passphrase: PassphraseRecord,
}

/// Merges issued credentials into a bootstrap bundle.
pub struct BootstrapAssembler<'a, S> {
    store: &'a S,
    config: &'a PkiConfig,
}

impl<'a, S: ResourceStore> BootstrapAssembler<'a, S> {
    /// Creates an assembler reading from `store`.
    #[must_use]
    pub const fn new(store: &'a S, config: &'a PkiConfig) -> Self {
        Self { store, config }
    }

    /// Reads the server then the controller credentials and merges them.
    ///
    /// The controller record is not read if the server record is unavailable.
    /// A new passphrase is generated on every call; persisting it only when
    /// absent is up to the caller.
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] if the bootstrap or passphrase secret name
    ///   is not configured.
    /// - [`Error::NotReady`] if a record does not exist or lacks an entry.
    /// - [`Error::UpstreamFailure`] if a store lookup fails.
    pub fn assemble(&self, identity: &ClusterIdentity) -> Result<BootstrapBundle> {
        let tls = &identity.tls;
        if tls.bootstrap_secret_name.is_empty() {
            return Err(Error::configuration(
                &identity.name,
                "no bootstrap secret name configured",
            ));
        }
        if tls.passphrase_secret_name.is_empty() {
            return Err(Error::configuration(
                &identity.name,
                "no passphrase secret name configured",
            ));
        }

        let naming = &self.config.naming;
        let server = self.read_record(identity, &naming.server_certificate(&identity.name))?;
        let client = self.read_record(identity, &naming.controller_certificate(&identity.name))?;

        let labels = self.config.labels(&identity.name);
        let credentials = BootstrapCredentialSet {
            metadata: ObjectMeta::namespaced(&tls.bootstrap_secret_name, &identity.namespace)
                .with_labels(labels.clone()),
            ca_cert: server.ca_cert,
            peer_cert: server.cert,
            peer_key: server.key,
            client_cert: client.cert,
            client_key: client.key,
        };
        let passphrase = PassphraseRecord::generate(
            ObjectMeta::namespaced(&tls.passphrase_secret_name, &identity.namespace)
                .with_labels(labels),
        );

        info!(
            cluster = %identity.name,
            secret = %credentials.metadata.name,
            "assembled bootstrap credentials"
        );
        Ok(BootstrapBundle {
            credentials,
            passphrase,
        })
    }

    fn read_record(&self, identity: &ClusterIdentity, name: &str) -> Result<IssuedKeyPair> {
        let data = self
            .store
            .get_secret(&identity.namespace, name)
            .map_err(|e| {
                let err = Error::from_store(name, e);
                warn!(cluster = %identity.name, error = %err, "issued credentials unavailable");
                err
            })?;

        let entry = |key: &str| {
            data.get(key)
                .cloned()
                .ok_or_else(|| Error::not_ready(name, format!("issued secret has no {key} entry")))
        };
        Ok(IssuedKeyPair {
            ca_cert: entry(keys::CORE_CA_CERT)?,
            cert: entry(keys::TLS_CERT)?,
            key: entry(keys::TLS_PRIVATE_KEY)?,
        })
    }
}

struct IssuedKeyPair {
    ca_cert: SecretBytes,
    cert: SecretBytes,
    key: SecretBytes,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::TlsConfig;

    fn identity() -> ClusterIdentity {
        ClusterIdentity::new("kafka", "prod")
            .with_brokers([0, 1])
            .with_tls(TlsConfig::self_issued().with_bootstrap_secrets("kafka-tls", "kafka-jks"))
    }

    fn issued(prefix: &str) -> SecretData {
        SecretData::new()
            .with(keys::CORE_CA_CERT, "ca")
            .with(keys::TLS_CERT, format!("{prefix}-cert").as_str())
            .with(keys::TLS_PRIVATE_KEY, format!("{prefix}-key").as_str())
    }

    fn ready_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.put_secret("prod", "kafka-server-certificate", issued("server"));
        store.put_secret("prod", "kafka-crd-controller", issued("client"));
        store
    }

    #[test]
    fn assembles_credential_set() {
        let store = ready_store();
        let config = PkiConfig::default();
        let bundle = BootstrapAssembler::new(&store, &config)
            .assemble(&identity())
            .expect("assemble");

        let creds = &bundle.credentials;
        assert_eq!(creds.metadata.name, "kafka-tls");
        assert_eq!(creds.metadata.namespace.as_deref(), Some("prod"));
        assert_eq!(creds.ca_cert, SecretBytes::from("ca"));
        assert_eq!(creds.peer_cert, SecretBytes::from("server-cert"));
        assert_eq!(creds.peer_key, SecretBytes::from("server-key"));
        assert_eq!(creds.client_cert, SecretBytes::from("client-cert"));
        assert_eq!(creds.client_key, SecretBytes::from("client-key"));

        assert_eq!(bundle.passphrase.metadata.name, "kafka-jks");
        assert_eq!(
            store.secret_lookups(),
            vec!["kafka-server-certificate", "kafka-crd-controller"]
        );
    }

    #[test]
    fn credential_secret_uses_fixed_keys() {
        let store = ready_store();
        let config = PkiConfig::default();
        let bundle = BootstrapAssembler::new(&store, &config)
            .assemble(&identity())
            .expect("assemble");

        let secret = bundle.credentials.to_secret();
        let keys: Vec<&str> = secret.data.keys().collect();
        assert_eq!(keys, vec!["caCert", "clientCert", "clientKey", "peerCert", "peerKey"]);

        let passphrase = bundle.passphrase.to_secret();
        assert_eq!(passphrase.data.keys().collect::<Vec<_>>(), vec!["password"]);
    }

    #[test]
    fn missing_server_record_skips_client_lookup() {
        let store = MemoryStore::new();
        store.put_secret("prod", "kafka-crd-controller", issued("client"));
        let config = PkiConfig::default();

        let err = BootstrapAssembler::new(&store, &config)
            .assemble(&identity())
            .expect_err("not ready");
        assert!(matches!(err, Error::NotReady { .. }));
        assert_eq!(err.resource(), "kafka-server-certificate");
        assert_eq!(store.secret_lookups(), vec!["kafka-server-certificate"]);
    }

    #[test]
    fn missing_client_record_is_not_ready() {
        let store = MemoryStore::new();
        store.put_secret("prod", "kafka-server-certificate", issued("server"));
        let config = PkiConfig::default();

        let err = BootstrapAssembler::new(&store, &config)
            .assemble(&identity())
            .expect_err("not ready");
        assert!(matches!(err, Error::NotReady { .. }));
        assert_eq!(err.resource(), "kafka-crd-controller");
    }

    #[test]
    fn store_failure_is_upstream() {
        let store = ready_store();
        store.fail_secret("prod", "kafka-server-certificate", "apiserver timeout");
        let config = PkiConfig::default();

        let err = BootstrapAssembler::new(&store, &config)
            .assemble(&identity())
            .expect_err("upstream");
        assert_eq!(err, Error::upstream("kafka-server-certificate", "apiserver timeout"));
        assert_eq!(store.secret_lookups().len(), 1);
    }

    #[test]
    fn partially_issued_record_is_not_ready() {
        let store = ready_store();
        store.put_secret(
            "prod",
            "kafka-crd-controller",
            SecretData::new().with(keys::TLS_CERT, "client-cert"),
        );
        let config = PkiConfig::default();

        let err = BootstrapAssembler::new(&store, &config)
            .assemble(&identity())
            .expect_err("not ready");
        assert!(matches!(err, Error::NotReady { .. }));
        assert_eq!(err.resource(), "kafka-crd-controller");
    }

    #[test]
    fn unconfigured_secret_names_fail_before_lookup() {
        let store = ready_store();
        let config = PkiConfig::default();
        let identity = ClusterIdentity::new("kafka", "prod");

        let err = BootstrapAssembler::new(&store, &config)
            .assemble(&identity)
            .expect_err("configuration");
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(store.secret_lookups().is_empty());
    }

    #[test]
    fn passphrase_is_fresh_on_every_call() {
        let store = ready_store();
        let config = PkiConfig::default();
        let assembler = BootstrapAssembler::new(&store, &config);

        let first = assembler.assemble(&identity()).expect("assemble");
        let second = assembler.assemble(&identity()).expect("assemble");
        assert_eq!(first.passphrase.passphrase.len(), PASSPHRASE_LENGTH);
        assert_eq!(second.passphrase.passphrase.len(), PASSPHRASE_LENGTH);
        assert_ne!(first.passphrase.passphrase, second.passphrase.passphrase);
        assert_eq!(first.credentials, second.credentials);
    }

    #[test]
    fn passphrase_is_alphanumeric() {
        let record = PassphraseRecord::generate(ObjectMeta::namespaced("p", "prod"));
        assert!(record
            .passphrase
            .as_bytes()
            .iter()
            .all(u8::is_ascii_alphanumeric));
    }
}
