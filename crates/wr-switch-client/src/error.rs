//! Switch client error types.

use thiserror::Error;

/// Errors from polling one device. Recoverable per tick — the relay
/// logs them and moves on to the next endpoint.
#[derive(Debug, Error)]
pub enum SwitchError {
    /// Transport failure: unreachable device, connection reset, timeout.
    #[error("request failed: {0}")]
    Request(String),

    /// The device answered with a non-2xx status.
    #[error("unexpected status code {0}")]
    UnexpectedStatus(u16),

    /// The response body was not a JSON report with a numeric power field.
    #[error("invalid report body: {0}")]
    InvalidBody(String),
}

/// Convenience alias for switch results.
pub type SwitchResult<T> = Result<T, SwitchError>;
