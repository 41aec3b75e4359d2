//! MQTT topic builders for the relay's outbound hierarchy.
//!
//! Topic structure:
//! ```text
//! mystrom/power/{client_id}
//! ```

const PREFIX: &str = "mystrom";

/// Power reading topic for one relay instance: `mystrom/power/{client_id}`.
pub fn power(client_id: &str) -> String {
    format!("{PREFIX}/power/{client_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_topic() {
        assert_eq!(power("garage-relay"), "mystrom/power/garage-relay");
    }

    #[test]
    fn power_topic_preserves_client_id() {
        assert_eq!(power("rpi_01.home"), "mystrom/power/rpi_01.home");
    }
}
