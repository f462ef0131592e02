//! PKI configuration.
//!
//! Loaded from JSON; every field has a default so an empty document is a
//! valid configuration.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::naming::NamingPolicy;

const CONFIG_RESOURCE: &str = "pki-config";

/// API identity of the owning cluster object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OwnerKind {
    /// API version of the cluster resource.
    pub api_version: String,
    /// Kind of the cluster resource.
    pub kind: String,
}

impl Default for OwnerKind {
    fn default() -> Self {
        Self {
            api_version: "kafka.clawbernetes.io/v1beta1".to_string(),
            kind: "KafkaCluster".to_string(),
        }
    }
}

/// Settings shared by the planner, binder and assembler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PkiConfig {
    /// Naming templates.
    pub naming: NamingPolicy,
    /// Namespace where cluster issuers look up their CA secrets.
    pub cluster_resource_namespace: String,
    /// Value of the `app` label on every emitted resource.
    pub app_label: String,
    /// Owner reference identity.
    pub owner: OwnerKind,
}

impl Default for PkiConfig {
    fn default() -> Self {
        Self {
            naming: NamingPolicy::default(),
            cluster_resource_namespace: "cert-manager".to_string(),
            app_label: "kafka".to_string(),
            owner: OwnerKind::default(),
        }
    }
}

impl PkiConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the document is malformed or invalid.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::configuration(CONFIG_RESOURCE, format!("invalid JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the file cannot be read or is invalid.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading PKI configuration");
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(
                CONFIG_RESOURCE,
                format!("failed to read {}: {e}", path.display()),
            )
        })?;
        Self::from_json_str(&contents)
    }

    /// Checks the configuration for values that would produce unusable resources.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.naming.validate()?;
        if self.cluster_resource_namespace.is_empty() {
            return Err(Error::configuration(
                CONFIG_RESOURCE,
                "clusterResourceNamespace cannot be empty",
            ));
        }
        if self.owner.api_version.is_empty() || self.owner.kind.is_empty() {
            return Err(Error::configuration(
                CONFIG_RESOURCE,
                "owner apiVersion and kind cannot be empty",
            ));
        }
        Ok(())
    }

    /// Labels attached to every resource emitted for `cluster`.
    #[must_use]
    pub fn labels(&self, cluster: &str) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("app".to_string(), self.app_label.clone()),
            (
                "kafka_issuer".to_string(),
                self.naming.cluster_issuer(cluster),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        let config = PkiConfig::from_json_str("{}").expect("valid");
        assert_eq!(config, PkiConfig::default());
        assert_eq!(config.cluster_resource_namespace, "cert-manager");
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = PkiConfig::from_json_str(
            r#"{"clusterResourceNamespace": "pki", "owner": {"kind": "Broker"}}"#,
        )
        .expect("valid");
        assert_eq!(config.cluster_resource_namespace, "pki");
        assert_eq!(config.owner.kind, "Broker");
        assert_eq!(config.owner.api_version, OwnerKind::default().api_version);
    }

    #[test]
    fn malformed_json_is_configuration_error() {
        let err = PkiConfig::from_json_str("{not json").expect_err("invalid");
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn empty_namespace_rejected() {
        let err = PkiConfig::from_json_str(r#"{"clusterResourceNamespace": ""}"#)
            .expect_err("invalid");
        assert_eq!(err.resource(), "pki-config");
    }

    #[test]
    fn invalid_template_rejected() {
        let err = PkiConfig::from_json_str(r#"{"naming": {"selfSigner": "signer"}}"#)
            .expect_err("invalid");
        assert_eq!(err.resource(), "naming.selfSigner");
    }

    #[test]
    fn labels_reference_cluster_issuer() {
        let labels = PkiConfig::default().labels("kafka");
        assert_eq!(labels.get("app").map(String::as_str), Some("kafka"));
        assert_eq!(
            labels.get("kafka_issuer").map(String::as_str),
            Some("kafka-issuer")
        );
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(br#"{"appLabel": "events"}"#).expect("write");
        let config = PkiConfig::from_file(file.path()).expect("valid");
        assert_eq!(config.app_label, "events");
    }

    #[test]
    fn missing_file_is_configuration_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = PkiConfig::from_file(&dir.path().join("missing.json")).expect_err("missing");
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
