//! WattRelay agent — library crate for the relay binary.
//!
//! Re-exports the configuration, event-loop driver, and poll-publish
//! loop so tests can exercise them without going through `main`.

pub mod config;
pub mod mqtt_loop;
pub mod relay;
