use serde::Deserialize;

/// Broker connection settings, loaded from the JSON settings file.
///
/// Field names on disk are camelCase (`caCert`, `clientCert`,
/// `privateKey`), matching the file format consumed by the relay.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerConfig {
    /// Broker hostname (e.g., an AWS IoT ATS endpoint).
    pub host: String,
    /// Broker TLS port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path to the CA certificate bundle (PEM).
    pub ca_cert: String,
    /// Path to the client X.509 certificate (PEM).
    pub client_cert: String,
    /// Path to the client private key (PEM).
    pub private_key: String,
    /// Keep-alive interval in seconds.
    #[serde(default = "default_keepalive")]
    pub keepalive_secs: u16,
    /// Seconds to wait for the broker's connection acknowledgment.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Seconds to wait for the session to accept a publish.
    #[serde(default = "default_publish_timeout")]
    pub publish_timeout_secs: u64,
}

fn default_port() -> u16 {
    8883
}

fn default_keepalive() -> u16 {
    30
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_publish_timeout() -> u64 {
    10
}
