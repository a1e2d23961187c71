//! TLS configuration and HTTPS connector construction.

use std::sync::Arc;

use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use rustls::{ClientConfig, RootCertStore};

use crate::ClientError;

/// Build the default TLS configuration.
///
/// Uses the ring crypto provider and the platform's native root
/// certificates. Certificates that fail to load are skipped.
pub fn default_tls_config() -> Result<ClientConfig, ClientError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let mut roots = RootCertStore::empty();
    let native_certs = rustls_native_certs::load_native_certs();
    if !native_certs.errors.is_empty() {
        // Log errors but continue - some certs may have loaded successfully
        #[cfg(feature = "tracing")]
        tracing::debug!("errors loading native certs: {:?}", native_certs.errors);
    }
    roots.add_parsable_certificates(native_certs.certs);

    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| ClientError::Transport(format!("invalid TLS configuration: {}", e)))?
        .with_root_certificates(roots)
        .with_no_client_auth();
    Ok(config)
}

/// Build a connector that speaks both `http://` and `https://`.
pub fn build_https_connector(tls_config: ClientConfig) -> HttpsConnector<HttpConnector> {
    HttpsConnectorBuilder::new()
        .with_tls_config(tls_config)
        .https_or_http()
        .enable_all_versions()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tls_config() {
        let config = default_tls_config().unwrap();
        assert!(config.alpn_protocols.is_empty());
    }

    #[test]
    fn test_build_https_connector() {
        let config = default_tls_config().unwrap();
        let _connector = build_https_connector(config);
    }
}
