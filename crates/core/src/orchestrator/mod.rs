//! Trajectory orchestrator.
//!
//! Runs the scripted sequence once:
//! - **Startup**: wait for the initial pose service (polled, cancellable)
//! - **Setup**: dispatch the initial pose, publish people
//! - **Planning**: path through waypoints, then smoothing, each a submit/accept/result action
//! - **Finish**: publish the smoothed path and release the transport

mod config;
mod context;
mod runner;
mod scenario;
mod types;

pub use config::OrchestratorConfig;
pub use context::OrchestratorContext;
pub use runner::TrajectoryOrchestrator;
pub use scenario::{InitialPose, PersonSpec, Scenario, Waypoint};
pub use types::{RunOutcome, RunReport};
