use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Bridge URL is an http(s) URL
/// - Polling intervals, timeouts and queue depth are not 0
/// - The scenario has at least one waypoint
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let url = config.bridge.url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "bridge.url must be an http(s) URL, got {:?}",
            config.bridge.url
        )));
    }

    let non_zero = [
        ("bridge.timeout_secs", config.bridge.timeout_secs as u64),
        (
            "bridge.availability_poll_interval_ms",
            config.bridge.availability_poll_interval_ms,
        ),
        (
            "orchestrator.service_poll_interval_ms",
            config.orchestrator.service_poll_interval_ms,
        ),
        (
            "orchestrator.server_wait_timeout_ms",
            config.orchestrator.server_wait_timeout_ms,
        ),
        (
            "orchestrator.result_timeout_ms",
            config.orchestrator.result_timeout_ms,
        ),
        ("endpoints.queue_depth", config.endpoints.queue_depth as u64),
    ];
    if let Some((field, _)) = non_zero.iter().find(|(_, value)| *value == 0) {
        return Err(ConfigError::ValidationError(format!("{} cannot be 0", field)));
    }

    if config.orchestrator.service_wait_timeout_ms == Some(0) {
        return Err(ConfigError::ValidationError(
            "orchestrator.service_wait_timeout_ms cannot be 0".to_string(),
        ));
    }

    if config.scenario.waypoints.is_empty() {
        return Err(ConfigError::ValidationError(
            "scenario.waypoints cannot be empty".to_string(),
        ));
    }

    Ok(())
}
