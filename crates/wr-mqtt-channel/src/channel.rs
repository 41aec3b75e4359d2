//! MQTT channel — async publish path to the broker.
//!
//! Wraps `rumqttc::AsyncClient` behind the `Channel` trait. The session
//! is always mutually authenticated; `connect` does not return until the
//! broker has acknowledged the connection.

use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, QoS};

use crate::config::BrokerConfig;
use crate::error::{MqttError, MqttResult};
use crate::tls;

/// Request queue capacity between the client handle and its event loop.
const REQUEST_CHANNEL_CAPACITY: usize = 64;

// ── Channel trait ─────────────────────────────────────────────

/// Abstraction for MQTT message publishing.
///
/// Enables mocking in tests without a real broker. The relay never
/// subscribes, so publishing is the whole surface.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Publish a raw payload to a topic, retain false.
    async fn publish(&self, topic: &str, payload: &[u8], qos: QoS) -> MqttResult<()>;
}

#[async_trait]
impl<C: Channel + ?Sized> Channel for std::sync::Arc<C> {
    async fn publish(&self, topic: &str, payload: &[u8], qos: QoS) -> MqttResult<()> {
        (**self).publish(topic, payload, qos).await
    }
}

// ── MqttChannel ───────────────────────────────────────────────

/// MQTT channel connected to the broker over mutual TLS.
///
/// Owns the `AsyncClient`. The `EventLoop` is returned separately from
/// `connect()` — the caller must keep driving it via `eventloop.poll()`
/// for keep-alives and reconnection to happen.
#[derive(Clone)]
pub struct MqttChannel {
    client: AsyncClient,
    publish_timeout: Duration,
}

impl MqttChannel {
    /// Establish the broker session.
    ///
    /// Loads and validates the TLS credentials, dials the broker, and
    /// waits for its ConnAck within `connect_timeout_secs`. Credential
    /// and connection failures are returned as errors — the caller
    /// treats them as fatal; there is no startup retry.
    pub async fn connect(config: &BrokerConfig, client_id: &str) -> MqttResult<(Self, EventLoop)> {
        let transport = tls::load_tls_transport(config)?;

        let mut options = MqttOptions::new(client_id, &config.host, config.port);
        options.set_keep_alive(Duration::from_secs(config.keepalive_secs.into()));
        options.set_transport(transport);

        let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);

        let connect_timeout = Duration::from_secs(config.connect_timeout_secs);
        tokio::time::timeout(connect_timeout, wait_for_connack(&mut eventloop))
            .await
            .map_err(|_| {
                MqttError::Connect(format!(
                    "no ConnAck from {}:{} within {}s",
                    config.host, config.port, config.connect_timeout_secs
                ))
            })??;

        tracing::debug!(host = %config.host, port = config.port, "broker acknowledged connection");

        Ok((
            Self {
                client,
                publish_timeout: Duration::from_secs(config.publish_timeout_secs),
            },
            eventloop,
        ))
    }

    /// Request a disconnect and wait out the grace period so the event
    /// loop can flush the request. Best effort — failures are logged,
    /// not returned, since this only runs at shutdown.
    pub async fn disconnect(&self, grace: Duration) {
        if let Err(e) = self.client.disconnect().await {
            tracing::warn!(error = %e, "MQTT disconnect request failed");
        }
        tokio::time::sleep(grace).await;
    }

    #[cfg(test)]
    fn from_parts(client: AsyncClient, publish_timeout: Duration) -> Self {
        Self {
            client,
            publish_timeout,
        }
    }
}

/// Poll the event loop until the broker accepts or rejects the session.
async fn wait_for_connack(eventloop: &mut EventLoop) -> MqttResult<()> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                return if ack.code == ConnectReturnCode::Success {
                    Ok(())
                } else {
                    Err(MqttError::Connect(format!(
                        "broker refused connection: {:?}",
                        ack.code
                    )))
                };
            }
            Ok(_) => continue,
            Err(e) => return Err(MqttError::Connect(e.to_string())),
        }
    }
}

#[async_trait]
impl Channel for MqttChannel {
    async fn publish(&self, topic: &str, payload: &[u8], qos: QoS) -> MqttResult<()> {
        tokio::time::timeout(
            self.publish_timeout,
            self.client.publish(topic, qos, false, payload),
        )
        .await
        .map_err(|_| {
            MqttError::Publish(format!(
                "publish to '{topic}' not accepted within {}ms",
                self.publish_timeout.as_millis()
            ))
        })?
        .map_err(|e| MqttError::Publish(e.to_string()))
    }
}
