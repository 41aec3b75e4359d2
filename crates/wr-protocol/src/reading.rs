use std::fmt;

use serde_json::json;

/// Identifier of the device a reading came from, as it appears on the wire.
///
/// Switches polled by IP address report under an `"ip"` key; switches
/// polled through a configured URL report under `"url"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceId {
    Ip(String),
    Url(String),
}

impl SourceId {
    /// The bare address, without the key distinction.
    pub fn address(&self) -> &str {
        match self {
            SourceId::Ip(addr) | SourceId::Url(addr) => addr,
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.address())
    }
}

/// A single power measurement taken from one device.
///
/// Transient: produced by a poll, serialized, published, dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerReading {
    /// Device that produced this reading.
    pub source: SourceId,
    /// Instantaneous power draw in watts.
    pub power: f64,
}

impl PowerReading {
    /// Encode the reading into its publish payload.
    ///
    /// The wire format carries power as a six-decimal string, e.g.
    /// `{"ip":"10.0.0.5","power":"12.500000"}`.
    pub fn to_payload(&self) -> serde_json::Result<Vec<u8>> {
        let power = format!("{:.6}", self.power);
        let value = match &self.source {
            SourceId::Ip(addr) => json!({ "ip": addr, "power": power }),
            SourceId::Url(addr) => json!({ "url": addr, "power": power }),
        };
        serde_json::to_vec(&value)
    }
}
