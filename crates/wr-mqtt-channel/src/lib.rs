//! Mutual-TLS MQTT session for the WattRelay agent.
//!
//! Provides a typed MQTT abstraction over rumqttc:
//! - `Channel` trait for publishing (mockable in tests)
//! - `MqttChannel` with mandatory mutual TLS for production
//! - `MockChannel` for testing without a broker
//! - credential loading and validation in `tls`

pub mod channel;
pub mod config;
pub mod error;
pub mod mock;
pub mod tls;

// Re-exports for convenience.
pub use channel::{Channel, MqttChannel};
pub use config::BrokerConfig;
pub use error::{MqttError, MqttResult};
pub use mock::MockChannel;
