use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix for environment overrides, e.g. `TRAJGEN_BRIDGE__URL`.
pub const ENV_PREFIX: &str = "TRAJGEN_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from file if present, otherwise from defaults,
/// applying environment overrides either way
pub fn load_config_or_default(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        return load_config(path);
    }

    Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[bridge]
url = "http://gateway:8000"

[orchestrator]
server_wait_timeout_ms = 2000
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.bridge.url, "http://gateway:8000");
        assert_eq!(config.orchestrator.server_wait_timeout_ms, 2000);
        assert_eq!(config.endpoints.smooth_path, "/smooth_path");
    }

    #[test]
    fn test_load_config_from_str_empty_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.endpoints.set_initial_pose, "/set_initial_pose");
        assert_eq!(config.endpoints.plan_topic, "/plan");
        assert_eq!(config.endpoints.queue_depth, 10);
        assert_eq!(config.scenario.waypoints.len(), 2);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_load_config_from_str_bad_type() {
        let toml = r#"
[bridge]
timeout_secs = "soon"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/trajgen.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_or_default_without_file() {
        let config = load_config_or_default(Path::new("/nonexistent/trajgen.toml")).unwrap();
        assert_eq!(config.endpoints.compute_path_through_poses, "/compute_path_through_poses");
        assert_eq!(config.orchestrator.service_poll_interval_ms, 1000);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[endpoints]
plan_topic = "/smoothed_plan"

[logging]
json = true

[scenario]
frame_id = "odom"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.endpoints.plan_topic, "/smoothed_plan");
        assert!(config.logging.json);
        assert_eq!(config.scenario.frame_id, "odom");
    }
}
