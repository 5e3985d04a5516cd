mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use trajgen_core::{
    load_config_or_default, validate_config, Endpoint, Failure, HttpBridge, RunOutcome,
    TrajectoryOrchestrator,
};

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "TRAJGEN_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "trajgen.toml";

#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn config_path() -> PathBuf {
    std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

async fn run() -> Result<i32> {
    let config_path = config_path();
    let loaded = load_config_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path));

    logging::init(loaded.as_ref().map(|c| c.logging.json).unwrap_or(false));
    let config = loaded?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded from {:?}", config_path);
    info!("Gateway: {}", config.bridge.url);

    let bridge = HttpBridge::new(&config.bridge).context("Failed to create gateway client")?;
    let context = bridge.context(&config.endpoints);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    let report = TrajectoryOrchestrator::new(config.orchestrator, context, config.scenario)
        .with_shutdown(shutdown_rx)
        .run()
        .await;

    info!("Transitions: {}", report.transitions.join(" -> "));

    // The orchestrator has dropped its publishers; flush what they queued.
    let delivery = bridge.shutdown().await;

    let outcome = match (report.outcome, delivery) {
        (RunOutcome::Completed { .. }, Err(e)) => RunOutcome::Failed {
            failure: Failure::Transport {
                endpoint: Endpoint::Plan,
                message: e.to_string(),
            },
        },
        (outcome, _) => outcome,
    };

    match &outcome {
        RunOutcome::Completed { plan } => {
            info!("Trajectory published with {} poses", plan.len())
        }
        RunOutcome::Failed { failure } => error!("Trajectory generation failed: {}", failure),
    }

    Ok(outcome.exit_code())
}

/// Wait for Ctrl+C or SIGTERM.
///
/// A handler that cannot be installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_default_and_override() {
        std::env::remove_var(CONFIG_ENV);
        assert_eq!(config_path(), PathBuf::from(DEFAULT_CONFIG_PATH));

        std::env::set_var(CONFIG_ENV, "/etc/trajgen/node.toml");
        assert_eq!(config_path(), PathBuf::from("/etc/trajgen/node.toml"));
        std::env::remove_var(CONFIG_ENV);
    }
}
