//! MQTT channel error types.

use thiserror::Error;

/// Errors that can occur while building or using the broker session.
#[derive(Debug, Error)]
pub enum MqttError {
    /// Certificate or key material is missing, malformed, or mismatched.
    /// Fatal at startup; never produced once the session is up.
    #[error("credential error: {0}")]
    Credential(String),

    /// The broker could not be reached, refused the connection, or the
    /// TLS handshake failed. Fatal at startup.
    #[error("connect error: {0}")]
    Connect(String),

    /// A publish was rejected or timed out. Recoverable per tick.
    #[error("publish error: {0}")]
    Publish(String),
}

/// Convenience alias for channel results.
pub type MqttResult<T> = Result<T, MqttError>;
