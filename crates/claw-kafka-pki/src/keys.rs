//! Well-known keys of byte-keyed secret payloads.

/// CA private key in an externally supplied trust anchor.
pub const CA_PRIVATE_KEY: &str = "caKey";
/// CA certificate in an externally supplied trust anchor and in the bootstrap set.
pub const CA_CERT: &str = "caCert";

/// CA certificate as written by the issuance controller.
pub const CORE_CA_CERT: &str = "ca.crt";
/// Certificate of a conventional TLS secret.
pub const TLS_CERT: &str = "tls.crt";
/// Private key of a conventional TLS secret.
pub const TLS_PRIVATE_KEY: &str = "tls.key";

/// Broker peer certificate in the bootstrap set.
pub const PEER_CERT: &str = "peerCert";
/// Broker peer key in the bootstrap set.
pub const PEER_PRIVATE_KEY: &str = "peerKey";
/// Client certificate in the bootstrap set.
pub const CLIENT_CERT: &str = "clientCert";
/// Client key in the bootstrap set.
pub const CLIENT_PRIVATE_KEY: &str = "clientKey";

/// Keystore passphrase.
pub const PASSWORD: &str = "password";
