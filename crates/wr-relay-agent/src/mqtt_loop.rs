//! MQTT event loop driver.
//!
//! Keeps polling the rumqttc event loop so keep-alives flow and
//! publishes leave the process. rumqttc re-dials on the poll after a
//! failure, which is what makes the session self-heal after broker
//! hiccups.

use std::time::Duration;

use rumqttc::{Event, EventLoop, Packet};
use tokio::sync::watch;

/// Delay before re-polling after an event loop error.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Drive the event loop.
///
/// Intended to be spawned as a background tokio task. The relay never
/// subscribes, so incoming traffic is connection management only.
/// Polling continues through shutdown so the disconnect request still
/// reaches the broker; the loop exits once the connection winds down
/// (first poll error) after shutdown was signalled.
pub async fn drive(mut eventloop: EventLoop, shutdown_rx: watch::Receiver<bool>) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                tracing::debug!("broker session (re)established");
            }
            Ok(event) => {
                tracing::trace!(?event, "MQTT event");
            }
            Err(e) => {
                if *shutdown_rx.borrow() {
                    tracing::debug!("event loop closed during shutdown");
                    break;
                }
                tracing::error!(error = %e, "MQTT event loop error, retrying in 5s");
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }
}
