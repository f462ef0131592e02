//! Resource naming templates.
//!
//! Names derived here are used both when emitting descriptors and when the
//! issued credentials are looked up again, so the same [`NamingPolicy`] value
//! must be handed to the planner and the assembler.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Placeholder substituted with the cluster name.
pub const CLUSTER_PLACEHOLDER: &str = "{cluster}";

/// Templates for every name derived from a cluster name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NamingPolicy {
    /// Self-signed issuer for the root certificate.
    pub self_signer: String,
    /// Root CA certificate and its secret.
    pub root_authority: String,
    /// CA-backed cluster issuer that signs every leaf certificate.
    pub cluster_issuer: String,
    /// Broker server (peer) certificate.
    pub server_certificate: String,
    /// Operator client certificate.
    pub controller_certificate: String,
    /// Headless service addressing each broker individually.
    pub headless_service: String,
    /// Shared service in front of all brokers.
    pub all_broker_service: String,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self {
            self_signer: "{cluster}-self-signer".to_string(),
            root_authority: "{cluster}-ca-certificate".to_string(),
            cluster_issuer: "{cluster}-issuer".to_string(),
            server_certificate: "{cluster}-server-certificate".to_string(),
            controller_certificate: "{cluster}-crd-controller".to_string(),
            headless_service: "{cluster}-headless".to_string(),
            all_broker_service: "{cluster}-all-broker".to_string(),
        }
    }
}

impl NamingPolicy {
    /// Name of the self-signed issuer.
    #[must_use]
    pub fn self_signer(&self, cluster: &str) -> String {
        render(&self.self_signer, cluster)
    }

    /// Name of the root certificate and its secret.
    #[must_use]
    pub fn root_authority(&self, cluster: &str) -> String {
        render(&self.root_authority, cluster)
    }

    /// Name of the cluster issuer.
    #[must_use]
    pub fn cluster_issuer(&self, cluster: &str) -> String {
        render(&self.cluster_issuer, cluster)
    }

    /// Name of the server certificate and its secret.
    #[must_use]
    pub fn server_certificate(&self, cluster: &str) -> String {
        render(&self.server_certificate, cluster)
    }

    /// Name of the controller certificate and its secret.
    #[must_use]
    pub fn controller_certificate(&self, cluster: &str) -> String {
        render(&self.controller_certificate, cluster)
    }

    /// Name of the service used for broker addressing.
    #[must_use]
    pub fn service(&self, cluster: &str, headless: bool) -> String {
        if headless {
            render(&self.headless_service, cluster)
        } else {
            render(&self.all_broker_service, cluster)
        }
    }

    /// Checks that every template references the cluster name.
    ///
    /// A template without the placeholder would give every cluster the same
    /// resource name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] naming the first offending template.
    pub fn validate(&self) -> Result<()> {
        let templates = [
            ("selfSigner", &self.self_signer),
            ("rootAuthority", &self.root_authority),
            ("clusterIssuer", &self.cluster_issuer),
            ("serverCertificate", &self.server_certificate),
            ("controllerCertificate", &self.controller_certificate),
            ("headlessService", &self.headless_service),
            ("allBrokerService", &self.all_broker_service),
        ];
        for (field, template) in templates {
            if !template.contains(CLUSTER_PLACEHOLDER) {
                return Err(Error::configuration(
                    format!("naming.{field}"),
                    format!("template '{template}' must contain {CLUSTER_PLACEHOLDER}"),
                ));
            }
        }
        Ok(())
    }
}

fn render(template: &str, cluster: &str) -> String {
    template.replace(CLUSTER_PLACEHOLDER, cluster)
}
