//! Orchestrator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing policy for the trajectory sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// How often to re-probe the initial pose service at startup (milliseconds).
    #[serde(default = "default_service_poll_interval")]
    pub service_poll_interval_ms: u64,

    /// Give up on the initial pose service after this long (milliseconds).
    /// Unset means wait until shutdown is requested.
    #[serde(default)]
    pub service_wait_timeout_ms: Option<u64>,

    /// How long each action server may take to report available (milliseconds).
    #[serde(default = "default_server_wait_timeout")]
    pub server_wait_timeout_ms: u64,

    /// Deadline for an accepted goal to deliver its result (milliseconds).
    #[serde(default = "default_result_timeout")]
    pub result_timeout_ms: u64,
}

fn default_service_poll_interval() -> u64 {
    1000 // 1 second
}

fn default_server_wait_timeout() -> u64 {
    10_000 // 10 seconds
}

fn default_result_timeout() -> u64 {
    120_000 // 2 minutes
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            service_poll_interval_ms: default_service_poll_interval(),
            service_wait_timeout_ms: None,
            server_wait_timeout_ms: default_server_wait_timeout(),
            result_timeout_ms: default_result_timeout(),
        }
    }
}

impl OrchestratorConfig {
    pub fn service_poll_interval(&self) -> Duration {
        Duration::from_millis(self.service_poll_interval_ms)
    }

    pub fn service_wait_timeout(&self) -> Option<Duration> {
        self.service_wait_timeout_ms.map(Duration::from_millis)
    }

    pub fn server_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.server_wait_timeout_ms)
    }

    pub fn result_timeout(&self) -> Duration {
        Duration::from_millis(self.result_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.service_poll_interval(), Duration::from_secs(1));
        assert!(config.service_wait_timeout().is_none());
        assert_eq!(config.server_wait_timeout(), Duration::from_secs(10));
        assert_eq!(config.result_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_deserialize_minimal() {
        let config: OrchestratorConfig = toml::from_str("").unwrap();
        assert_eq!(config.service_poll_interval_ms, 1000);
        assert_eq!(config.server_wait_timeout_ms, 10_000);
        assert!(config.service_wait_timeout_ms.is_none());
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
            service_poll_interval_ms = 250
            service_wait_timeout_ms = 30000
            server_wait_timeout_ms = 5000
            result_timeout_ms = 60000
        "#;
        let config: OrchestratorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.service_poll_interval(), Duration::from_millis(250));
        assert_eq!(config.service_wait_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.server_wait_timeout(), Duration::from_secs(5));
        assert_eq!(config.result_timeout(), Duration::from_secs(60));
    }
}
