//! The poll-publish loop.
//!
//! On a fixed interval, fetches one power reading per configured
//! endpoint and publishes it at QoS 0. Errors are isolated per
//! endpoint: one dead switch or one missed publish never stops the
//! relay or the remaining devices.

use std::time::Duration;

use rumqttc::QoS;
use tokio::sync::watch;
use tokio::time;

use wr_mqtt_channel::Channel;
use wr_switch_client::ReadingSource;

/// Outcome of one tick, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Readings fetched and published.
    pub published: usize,
    /// Endpoints that failed to fetch or publish this tick.
    pub failed: usize,
    /// Blank entries skipped without a fetch attempt.
    pub skipped: usize,
}

/// Run the relay loop until shutdown is signalled.
///
/// The first tick fires immediately after connect; after that the loop
/// sleeps out the interval between ticks. Shutdown interrupts the
/// inter-tick sleep but never a tick in flight — every operation inside
/// a tick is itself bounded, so a tick always finishes promptly.
pub async fn run<C, S>(
    channel: C,
    source: S,
    endpoints: Vec<String>,
    topic: String,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    C: Channel,
    S: ReadingSource,
{
    let mut ticker = time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let summary = run_tick(&channel, &source, &endpoints, &topic).await;
                tracing::info!(
                    published = summary.published,
                    failed = summary.failed,
                    skipped = summary.skipped,
                    "poll tick complete"
                );
            }
            changed = shutdown_rx.changed() => {
                // A dropped sender means the process is winding down too.
                if changed.is_err() || *shutdown_rx.borrow() {
                    tracing::info!("relay loop stopping");
                    break;
                }
            }
        }
    }
}

/// Poll every endpoint once, in order, and publish what was read.
///
/// Blank entries are skipped without a fetch. A fetch or publish
/// failure is logged with its endpoint and the iteration moves on —
/// the rest of the tick is unaffected.
pub async fn run_tick<C, S>(
    channel: &C,
    source: &S,
    endpoints: &[String],
    topic: &str,
) -> TickSummary
where
    C: Channel,
    S: ReadingSource,
{
    let mut summary = TickSummary::default();

    for endpoint in endpoints {
        if endpoint.is_empty() {
            summary.skipped += 1;
            continue;
        }

        let reading = match source.fetch(endpoint).await {
            Ok(reading) => reading,
            Err(e) => {
                tracing::warn!(endpoint = %endpoint, error = %e, "reading fetch failed, skipping endpoint this tick");
                summary.failed += 1;
                continue;
            }
        };

        let payload = match reading.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(endpoint = %endpoint, error = %e, "failed to encode reading");
                summary.failed += 1;
                continue;
            }
        };

        match channel.publish(topic, &payload, QoS::AtMostOnce).await {
            Ok(()) => {
                tracing::debug!(endpoint = %endpoint, power = reading.power, "reading published");
                summary.published += 1;
            }
            Err(e) => {
                tracing::warn!(endpoint = %endpoint, error = %e, "publish failed, skipping endpoint this tick");
                summary.failed += 1;
            }
        }
    }

    summary
}
