//! Relay configuration: command line plus the JSON settings file.
//!
//! Everything derived from the command line is folded into one
//! immutable `RelayConfig` at startup and passed by reference from
//! there on — no ambient state.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgGroup, Parser};

use wr_mqtt_channel::BrokerConfig;
use wr_switch_client::AddressMode;

/// Command-line surface of the relay.
#[derive(Debug, Parser)]
#[command(name = "wr-relay-agent", version)]
#[command(about = "Relays myStrom power readings to a mutual-TLS MQTT broker")]
#[command(group(
    ArgGroup::new("switches")
        .required(true)
        .args(["mystrom_switch_ips", "mystrom_switch_url"])
))]
pub struct Cli {
    /// Path to the JSON connection-settings file.
    #[arg(long = "conf")]
    pub conf: PathBuf,

    /// MQTT client identifier to connect with.
    #[arg(long = "client-id")]
    pub client_id: String,

    /// Comma-separated switch IP addresses, polled at http://<ip>/report.
    #[arg(long = "mystrom-switch-ips")]
    pub mystrom_switch_ips: Option<String>,

    /// Comma-separated switch report URLs, used verbatim.
    #[arg(long = "mystrom-switch-url")]
    pub mystrom_switch_url: Option<String>,

    /// Seconds between poll ticks.
    #[arg(long = "interval-secs", default_value_t = 60)]
    pub interval_secs: u64,

    /// Milliseconds granted to flush the broker session at shutdown.
    #[arg(long = "grace-millis", default_value_t = 250)]
    pub grace_millis: u64,
}

/// Immutable runtime configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub client_id: String,
    pub endpoints: Vec<String>,
    pub mode: AddressMode,
    pub interval: Duration,
    pub grace: Duration,
    pub broker: BrokerConfig,
}

impl RelayConfig {
    /// Resolve the command line into a runtime config, loading the
    /// settings file. Any failure here is fatal to startup.
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(&cli.conf)
            .with_context(|| format!("failed to read settings file '{}'", cli.conf.display()))?;
        let broker: BrokerConfig = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse settings file '{}'", cli.conf.display()))?;

        // The required ArgGroup guarantees exactly one list is present.
        let (raw, mode) = match (&cli.mystrom_switch_ips, &cli.mystrom_switch_url) {
            (Some(ips), None) => (ips.as_str(), AddressMode::IpReport),
            (None, Some(urls)) => (urls.as_str(), AddressMode::DirectUrl),
            _ => anyhow::bail!("exactly one switch list must be given"),
        };

        Ok(Self {
            client_id: cli.client_id,
            endpoints: split_endpoints(raw),
            mode,
            interval: Duration::from_secs(cli.interval_secs),
            grace: Duration::from_millis(cli.grace_millis),
            broker,
        })
    }
}

/// Split a comma-separated endpoint list, preserving order and
/// duplicates. Entries are trimmed; blank entries survive here and are
/// skipped at poll time.
fn split_endpoints(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).collect()
}
