//! Subject and DNS alternative name derivation for broker certificates.
//!
//! Order matters: stored certificates are compared against freshly derived
//! ones, so the list must come out identical on every pass.

use crate::naming::NamingPolicy;
use crate::types::ClusterIdentity;

const CLUSTER_DOMAIN: &str = "svc.cluster.local";

/// Returns the common name for the broker server certificate.
///
/// `<service>.<namespace>.svc.cluster.local`, where the service is the
/// headless one when brokers are addressed individually.
#[must_use]
pub fn common_name(naming: &NamingPolicy, identity: &ClusterIdentity) -> String {
    let service = naming.service(&identity.name, identity.headless);
    format!("{service}.{}.{CLUSTER_DOMAIN}", identity.namespace)
}

/// Returns the DNS alternative names for the broker server certificate.
///
/// Three names per broker in topology order (fully qualified, `.svc` and
/// namespace-qualified), followed by the common name and three shorter forms
/// of the service name. Always `3 * brokers + 4` entries.
#[must_use]
pub fn dns_names(naming: &NamingPolicy, identity: &ClusterIdentity) -> Vec<String> {
    let namespace = &identity.namespace;
    let service = naming.service(&identity.name, identity.headless);

    let mut names = Vec::with_capacity(3 * identity.brokers.len() + 4);
    for broker in &identity.brokers {
        let host = if identity.headless {
            format!("{}-{broker}.{service}.{namespace}", identity.name)
        } else {
            format!("{}-{broker}.{namespace}", identity.name)
        };
        names.push(format!("{host}.{CLUSTER_DOMAIN}"));
        names.push(format!("{host}.svc"));
        names.push(host);
    }

    names.push(common_name(naming, identity));
    names.push(format!("{service}.{namespace}.svc"));
    names.push(format!("{service}.{namespace}"));
    names.push(service);
    names
}
