use serde::{Deserialize, Serialize};

use crate::orchestrator::{OrchestratorConfig, Scenario};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub scenario: Scenario,
}

/// Middleware gateway configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BridgeConfig {
    /// Gateway base URL (e.g., "http://localhost:9090")
    #[serde(default = "default_bridge_url")]
    pub url: String,
    /// Timeout for short requests in seconds (default: 30).
    /// Result long-polls are bounded by the orchestrator instead.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Interval between availability probes in milliseconds
    #[serde(default = "default_availability_poll")]
    pub availability_poll_interval_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            url: default_bridge_url(),
            timeout_secs: default_timeout(),
            availability_poll_interval_ms: default_availability_poll(),
        }
    }
}

fn default_bridge_url() -> String {
    "http://127.0.0.1:9090".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_availability_poll() -> u64 {
    100
}

/// Names of the services, actions and topics on the middleware
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointConfig {
    #[serde(default = "default_set_initial_pose")]
    pub set_initial_pose: String,
    #[serde(default = "default_compute_path")]
    pub compute_path_through_poses: String,
    #[serde(default = "default_smooth_path")]
    pub smooth_path: String,
    #[serde(default = "default_plan_topic")]
    pub plan_topic: String,
    #[serde(default = "default_people_topic")]
    pub people_topic: String,
    /// Outgoing queue depth for each publisher
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            set_initial_pose: default_set_initial_pose(),
            compute_path_through_poses: default_compute_path(),
            smooth_path: default_smooth_path(),
            plan_topic: default_plan_topic(),
            people_topic: default_people_topic(),
            queue_depth: default_queue_depth(),
        }
    }
}

fn default_set_initial_pose() -> String {
    "/set_initial_pose".to_string()
}

fn default_compute_path() -> String {
    "/compute_path_through_poses".to_string()
}

fn default_smooth_path() -> String {
    "/smooth_path".to_string()
}

fn default_plan_topic() -> String {
    "/plan".to_string()
}

fn default_people_topic() -> String {
    "/people".to_string()
}

fn default_queue_depth() -> usize {
    10
}

/// Log output configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}
