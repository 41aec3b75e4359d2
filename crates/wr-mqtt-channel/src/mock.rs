//! Mock MQTT channel for testing without a real broker.
//!
//! Records all published messages for assertion in tests and can be
//! switched into a failing mode to exercise publish error paths.

use std::sync::Mutex;

use async_trait::async_trait;
use rumqttc::QoS;

use crate::channel::Channel;
use crate::error::{MqttError, MqttResult};

/// A recorded publish call.
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: QoS,
}

/// Mock implementation of the `Channel` trait.
///
/// Stores all publishes in memory for test verification. Thread-safe
/// via `Mutex` (fine for test contexts).
pub struct MockChannel {
    published: Mutex<Vec<PublishedMessage>>,
    failing: Mutex<bool>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            failing: Mutex::new(false),
        }
    }

    /// When set, every publish fails with `MqttError::Publish`.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    /// Get all published messages.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().unwrap().clone()
    }

    /// Get the last published message.
    pub fn last_published(&self) -> Option<PublishedMessage> {
        self.published.lock().unwrap().last().cloned()
    }

    /// Get published messages for a specific topic.
    pub fn published_to(&self, topic: &str) -> Vec<PublishedMessage> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.topic == topic)
            .cloned()
            .collect()
    }

    /// Clear all recorded state.
    pub fn reset(&self) {
        self.published.lock().unwrap().clear();
        *self.failing.lock().unwrap() = false;
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Channel for MockChannel {
    async fn publish(&self, topic: &str, payload: &[u8], qos: QoS) -> MqttResult<()> {
        if *self.failing.lock().unwrap() {
            return Err(MqttError::Publish(format!(
                "injected failure publishing to '{topic}'"
            )));
        }
        self.published.lock().unwrap().push(PublishedMessage {
            topic: topic.to_string(),
            payload: payload.to_vec(),
            qos,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_records_messages() {
        let mock = MockChannel::new();
        mock.publish("test/topic", b"hello", QoS::AtMostOnce)
            .await
            .unwrap();
        mock.publish("test/other", b"world", QoS::AtMostOnce)
            .await
            .unwrap();

        let msgs = mock.published();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].topic, "test/topic");
        assert_eq!(msgs[0].payload, b"hello");
        assert_eq!(msgs[1].topic, "test/other");
    }

    #[tokio::test]
    async fn failing_mode_rejects_publishes() {
        let mock = MockChannel::new();
        mock.set_failing(true);
        let err = mock
            .publish("test/topic", b"x", QoS::AtMostOnce)
            .await
            .err()
            .expect("should fail");
        assert!(matches!(err, MqttError::Publish(_)));
        assert!(mock.published().is_empty());
    }

    #[tokio::test]
    async fn last_published() {
        let mock = MockChannel::new();
        assert!(mock.last_published().is_none());

        mock.publish("a", b"1", QoS::AtMostOnce).await.unwrap();
        mock.publish("b", b"2", QoS::AtMostOnce).await.unwrap();

        let last = mock.last_published().unwrap();
        assert_eq!(last.topic, "b");
    }

    #[tokio::test]
    async fn published_to_filter() {
        let mock = MockChannel::new();
        mock.publish("topic/a", b"1", QoS::AtMostOnce).await.unwrap();
        mock.publish("topic/b", b"2", QoS::AtMostOnce).await.unwrap();
        mock.publish("topic/a", b"3", QoS::AtMostOnce).await.unwrap();

        let filtered = mock.published_to("topic/a");
        assert_eq!(filtered.len(), 2);
    }

    #[tokio::test]
    async fn reset_clears_state() {
        let mock = MockChannel::new();
        mock.publish("t", b"d", QoS::AtMostOnce).await.unwrap();
        mock.set_failing(true);

        mock.reset();
        assert!(mock.published().is_empty());
        assert!(mock.publish("t", b"d", QoS::AtMostOnce).await.is_ok());
    }
}
