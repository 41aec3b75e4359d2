//! Shared wire types for WattRelay.
//!
//! Defines the power reading published by the relay and the MQTT topic
//! builders for its outbound hierarchy.

pub mod reading;
pub mod topics;

pub use reading::*;
