//! Client configuration.

use std::time::Duration;

/// Tunables for the coordination core.
///
/// `routing_group_size` must match the routing layer's replication group
/// size; the expected reply count is derived from it rather than baked into
/// call sites.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Size G of a replication group in the routing layer.
    pub routing_group_size: usize,
    /// Deadline applied to every operation that awaits replies.
    pub default_timeout: Duration,
    /// Granularity of the deadline sweeper. An expired operation is
    /// completed within one sweep of its deadline.
    pub sweep_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            routing_group_size: 4,
            default_timeout: Duration::from_secs(10),
            sweep_interval: Duration::from_millis(50),
        }
    }
}

impl ClientConfig {
    /// Upper bound on replies per request: the routing layer fans out to a
    /// group of size G and may deliver up to 2G replies.
    pub fn expected_reply_count(&self) -> usize {
        2 * self.routing_group_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.routing_group_size, 4);
        assert_eq!(config.expected_reply_count(), 8);
        assert_eq!(config.default_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_expected_count_tracks_group_size() {
        let config = ClientConfig {
            routing_group_size: 16,
            ..ClientConfig::default()
        };
        assert_eq!(config.expected_reply_count(), 32);
    }
}
