//! HTTP reading source for myStrom smart plugs.
//!
//! Polls a switch's report endpoint over plain HTTP with a bounded
//! timeout and decodes the power measurement. One abstraction covers
//! both addressing schemes (IP address vs. full report URL).

pub mod client;
pub mod error;

// Re-exports for convenience.
pub use client::{AddressMode, ReadingSource, SwitchClient, DEFAULT_FETCH_TIMEOUT};
pub use error::{SwitchError, SwitchResult};
