//! Mutual-TLS credential loading for the broker session.
//!
//! Loads the CA bundle, client X.509 certificate, and private key from
//! PEM files and builds a rustls client configuration. The client
//! certificate is always presented; there is no anonymous path. All
//! failures are fatal at startup, before any connection attempt.

use std::io::BufReader;
use std::sync::Arc;

use rumqttc::{TlsConfiguration, Transport};
use rustls::pki_types::{CertificateDer, PrivateKeyDer};

use crate::config::BrokerConfig;
use crate::error::{MqttError, MqttResult};

/// Build a rustls client configuration from the PEM paths in the config.
///
/// Fails with `MqttError::Credential` if any file is unreadable, the CA
/// bundle or client chain yields no certificates, the key file holds no
/// key, or rustls rejects the certificate/key pair.
pub fn client_tls_config(config: &BrokerConfig) -> MqttResult<rustls::ClientConfig> {
    let mut roots = rustls::RootCertStore::empty();
    let ca_certs = read_certs(&config.ca_cert)?;
    if ca_certs.is_empty() {
        return Err(MqttError::Credential(format!(
            "no certificates found in CA bundle '{}'",
            config.ca_cert
        )));
    }
    for cert in ca_certs {
        roots.add(cert).map_err(|e| {
            MqttError::Credential(format!(
                "rejected CA certificate in '{}': {e}",
                config.ca_cert
            ))
        })?;
    }

    let client_chain = read_certs(&config.client_cert)?;
    if client_chain.is_empty() {
        return Err(MqttError::Credential(format!(
            "no certificates found in client cert '{}'",
            config.client_cert
        )));
    }

    let key = read_private_key(&config.private_key)?;

    rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_client_auth_cert(client_chain, key)
        .map_err(|e| MqttError::Credential(format!("client certificate/key pair rejected: {e}")))
}

/// Build the rumqttc TLS transport from the credential material.
pub fn load_tls_transport(config: &BrokerConfig) -> MqttResult<Transport> {
    let tls = client_tls_config(config)?;
    Ok(Transport::tls_with_config(TlsConfiguration::Rustls(
        Arc::new(tls),
    )))
}

fn read_certs(path: &str) -> MqttResult<Vec<CertificateDer<'static>>> {
    let file = std::fs::File::open(path)
        .map_err(|e| MqttError::Credential(format!("failed to read '{path}': {e}")))?;
    let mut reader = BufReader::new(file);
    rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| MqttError::Credential(format!("malformed PEM in '{path}': {e}")))
}

fn read_private_key(path: &str) -> MqttResult<PrivateKeyDer<'static>> {
    let file = std::fs::File::open(path)
        .map_err(|e| MqttError::Credential(format!("failed to read '{path}': {e}")))?;
    let mut reader = BufReader::new(file);
    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| MqttError::Credential(format!("malformed private key in '{path}': {e}")))?
        .ok_or_else(|| MqttError::Credential(format!("no private key found in '{path}'")))
}
