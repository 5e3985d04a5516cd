pub mod bridge;
pub mod config;
pub mod messages;
pub mod orchestrator;
pub mod sequence;
pub mod testing;
pub mod transport;

pub use bridge::HttpBridge;
pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, BridgeConfig,
    Config, ConfigError, EndpointConfig, LoggingConfig,
};
pub use orchestrator::{
    OrchestratorConfig, OrchestratorContext, RunOutcome, RunReport, Scenario,
    TrajectoryOrchestrator,
};
pub use sequence::{Endpoint, Failure, SequenceState};
pub use transport::TransportError;
