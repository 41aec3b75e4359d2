//! The switch poller: one GET per device per tick.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use wr_protocol::{PowerReading, SourceId};

use crate::error::{SwitchError, SwitchResult};

/// Default per-request timeout for device fetches.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

// ── ReadingSource trait ───────────────────────────────────────

/// Abstraction for fetching one power reading from one endpoint.
///
/// Seam for stubbing devices in relay-loop tests.
#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Fetch the current reading from `endpoint`. No retries — the
    /// caller decides what a failure means.
    async fn fetch(&self, endpoint: &str) -> SwitchResult<PowerReading>;
}

// ── Addressing ────────────────────────────────────────────────

/// How a configured endpoint maps to a report URL and a wire identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    /// Endpoint is an IP address; the report lives at `http://<ip>/report`.
    IpReport,
    /// Endpoint is a full URL, used verbatim.
    DirectUrl,
}

impl AddressMode {
    /// The URL to GET for a given endpoint.
    pub fn report_url(&self, endpoint: &str) -> String {
        match self {
            AddressMode::IpReport => format!("http://{endpoint}/report"),
            AddressMode::DirectUrl => endpoint.to_string(),
        }
    }

    /// The wire identifier for a given endpoint.
    pub fn source_id(&self, endpoint: &str) -> SourceId {
        match self {
            AddressMode::IpReport => SourceId::Ip(endpoint.to_string()),
            AddressMode::DirectUrl => SourceId::Url(endpoint.to_string()),
        }
    }
}

// ── SwitchClient ──────────────────────────────────────────────

/// myStrom switch report body (see <https://api.mystrom.ch>). Only the
/// power field matters here; serde accepts it as integer or float.
#[derive(Debug, Deserialize)]
struct SwitchReport {
    power: f64,
}

/// HTTP client polling myStrom switches.
pub struct SwitchClient {
    http: reqwest::Client,
    mode: AddressMode,
}

impl SwitchClient {
    pub fn new(mode: AddressMode) -> Self {
        Self::with_timeout(mode, DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(mode: AddressMode, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build reqwest client");
        Self { http, mode }
    }
}

#[async_trait]
impl ReadingSource for SwitchClient {
    async fn fetch(&self, endpoint: &str) -> SwitchResult<PowerReading> {
        let url = self.mode.report_url(endpoint);
        tracing::debug!(url = %url, "polling switch");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| SwitchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SwitchError::UnexpectedStatus(status.as_u16()));
        }

        let report: SwitchReport = response
            .json()
            .await
            .map_err(|e| SwitchError::InvalidBody(e.to_string()))?;

        Ok(PowerReading {
            source: self.mode.source_id(endpoint),
            power: report.power,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Endpoint string for a mock server in IP-report mode:
    /// `127.0.0.1:<port>`, so the client GETs `http://127.0.0.1:<port>/report`.
    fn host_endpoint(server: &MockServer) -> String {
        server.uri().trim_start_matches("http://").to_string()
    }

    #[test]
    fn report_url_mapping() {
        assert_eq!(
            AddressMode::IpReport.report_url("10.0.0.5"),
            "http://10.0.0.5/report"
        );
        assert_eq!(
            AddressMode::DirectUrl.report_url("http://plug.local:8080/report"),
            "http://plug.local:8080/report"
        );
    }

    #[test]
    fn source_id_mapping() {
        assert_eq!(
            AddressMode::IpReport.source_id("10.0.0.5"),
            SourceId::Ip("10.0.0.5".into())
        );
        assert_eq!(
            AddressMode::DirectUrl.source_id("http://plug/report"),
            SourceId::Url("http://plug/report".into())
        );
    }

    #[tokio::test]
    async fn fetch_float_power() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/report"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "power": 12.5,
                "relay": true,
                "temperature": 22.4
            })))
            .mount(&server)
            .await;

        let client = SwitchClient::new(AddressMode::IpReport);
        let endpoint = host_endpoint(&server);
        let reading = client.fetch(&endpoint).await.unwrap();

        assert_eq!(reading.power, 12.5);
        assert_eq!(reading.source, SourceId::Ip(endpoint));
    }

    #[tokio::test]
    async fn fetch_integer_power() {
        // Some firmware reports whole watts as a JSON integer.
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/report"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "power": 42 })),
            )
            .mount(&server)
            .await;

        let client = SwitchClient::new(AddressMode::IpReport);
        let reading = client.fetch(&host_endpoint(&server)).await.unwrap();
        assert_eq!(reading.power, 42.0);
    }

    #[tokio::test]
    async fn fetch_direct_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/custom/report"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "power": 7.25 })),
            )
            .mount(&server)
            .await;

        let url = format!("{}/custom/report", server.uri());
        let client = SwitchClient::new(AddressMode::DirectUrl);
        let reading = client.fetch(&url).await.unwrap();

        assert_eq!(reading.power, 7.25);
        assert_eq!(reading.source, SourceId::Url(url));
    }

    #[tokio::test]
    async fn non_success_status_is_rejected_before_parsing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/report"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(serde_json::json!({ "power": 1.0 })),
            )
            .mount(&server)
            .await;

        let client = SwitchClient::new(AddressMode::IpReport);
        let err = client
            .fetch(&host_endpoint(&server))
            .await
            .err()
            .expect("should fail");
        assert!(matches!(err, SwitchError::UnexpectedStatus(500)));
    }

    #[tokio::test]
    async fn invalid_body_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/report"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = SwitchClient::new(AddressMode::IpReport);
        let err = client
            .fetch(&host_endpoint(&server))
            .await
            .err()
            .expect("should fail");
        assert!(matches!(err, SwitchError::InvalidBody(_)));
    }

    #[tokio::test]
    async fn missing_power_field_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/report"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "relay": true })),
            )
            .mount(&server)
            .await;

        let client = SwitchClient::new(AddressMode::IpReport);
        let err = client
            .fetch(&host_endpoint(&server))
            .await
            .err()
            .expect("should fail");
        assert!(matches!(err, SwitchError::InvalidBody(_)));
    }

    #[tokio::test]
    async fn slow_device_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/report"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "power": 1.0 }))
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        // Client timeout is 200ms, mock delays 10s → bounded failure.
        let client = SwitchClient::with_timeout(AddressMode::IpReport, Duration::from_millis(200));
        let err = client
            .fetch(&host_endpoint(&server))
            .await
            .err()
            .expect("should time out");
        assert!(matches!(err, SwitchError::Request(_)));
    }
}
