//! WattRelay agent — relays myStrom power readings to a
//! mutually-authenticated MQTT broker.
//!
//! Wires credential loading, the broker session, and the poll-publish
//! loop into a single long-running binary.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use wr_mqtt_channel::MqttChannel;
use wr_relay_agent::config::{Cli, RelayConfig};
use wr_relay_agent::{mqtt_loop, relay};
use wr_switch_client::SwitchClient;

/// Upper bound on waiting for an in-flight tick at shutdown. Every
/// operation inside a tick is bounded, so this only trips if something
/// is badly wrong.
const SHUTDOWN_TICK_GRACE: Duration = Duration::from_secs(30);

/// Upper bound on waiting for the event loop driver to wind down.
const DRIVER_STOP_GRACE: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "wr-relay-agent starting"
    );

    // ── Load config ─────────────────────────────────────────────
    let cli = Cli::parse();
    let config = RelayConfig::from_cli(cli)?;
    tracing::info!(
        client_id = %config.client_id,
        host = %config.broker.host,
        port = config.broker.port,
        endpoints = config.endpoints.len(),
        interval_secs = config.interval.as_secs(),
        "config loaded"
    );

    // ── Broker session ──────────────────────────────────────────
    // Credential and connection failures are fatal here: they mean
    // misconfiguration, and retrying is the supervisor's call.
    let (channel, eventloop) = MqttChannel::connect(&config.broker, &config.client_id)
        .await
        .context("failed to establish broker session")?;
    tracing::info!("broker session established");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let driver = tokio::spawn(mqtt_loop::drive(eventloop, shutdown_rx.clone()));

    // ── Relay loop ──────────────────────────────────────────────
    let source = SwitchClient::new(config.mode);
    let topic = wr_protocol::topics::power(&config.client_id);
    let mut relay_task = tokio::spawn(relay::run(
        channel.clone(),
        source,
        config.endpoints.clone(),
        topic,
        config.interval,
        shutdown_rx,
    ));

    tracing::info!("wr-relay-agent ready");

    let relay_died = tokio::select! {
        _ = &mut relay_task => {
            tracing::error!("relay loop exited unexpectedly");
            true
        }
        // Graceful shutdown on SIGINT/SIGTERM
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
            false
        }
    };

    // ── Wind down ───────────────────────────────────────────────
    // Let an in-flight tick finish, flush the session, stop polling.
    let _ = shutdown_tx.send(true);
    if !relay_died
        && tokio::time::timeout(SHUTDOWN_TICK_GRACE, &mut relay_task)
            .await
            .is_err()
    {
        tracing::warn!("relay loop did not stop within shutdown grace, aborting it");
        relay_task.abort();
    }

    channel.disconnect(config.grace).await;

    if tokio::time::timeout(DRIVER_STOP_GRACE, driver).await.is_err() {
        tracing::debug!("event loop driver still running at exit");
    }

    if relay_died {
        anyhow::bail!("relay loop exited unexpectedly");
    }

    tracing::info!("wr-relay-agent stopped");
    Ok(())
}
