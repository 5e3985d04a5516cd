//! Testing utilities and an in-memory transport.
//!
//! [`MockBridge`] implements every transport trait, records each call in
//! invocation order, and lets tests script availability, acceptance and
//! results per action.
//!
//! # Example
//!
//! ```rust,ignore
//! use trajgen_core::testing::{fixtures, MockBridge, ResultBehavior};
//!
//! let bridge = MockBridge::new();
//! bridge.set_path_result(ResultBehavior::Succeed(fixtures::path("p1", 3)));
//! bridge.reject_smooth_goals();
//!
//! let orchestrator = TrajectoryOrchestrator::new(config, bridge.context(), Scenario::default());
//! let report = orchestrator.run().await;
//! assert_eq!(bridge.count(CallKind::PlanPublished), 0);
//! ```

mod mock_bridge;

pub use mock_bridge::{ActionBehavior, CallKind, MockBridge, RecordedCall, ResultBehavior};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::messages::{Header, Path, Point, Pose, PoseStamped, Quaternion};
    use crate::orchestrator::OrchestratorConfig;

    /// Create a straight path of `len` poses along +x in `frame_id`.
    ///
    /// The frame id doubles as a label so tests can tell paths apart.
    pub fn path(frame_id: &str, len: usize) -> Path {
        Path {
            header: Header::in_frame(frame_id),
            poses: (0..len)
                .map(|i| PoseStamped {
                    header: Header::in_frame(frame_id),
                    pose: Pose::new(Point::new(i as f64 * 0.1, 0.0, 0.0), Quaternion::default()),
                })
                .collect(),
        }
    }

    /// Orchestrator timings short enough for tests.
    pub fn fast_config() -> OrchestratorConfig {
        OrchestratorConfig {
            service_poll_interval_ms: 10,
            service_wait_timeout_ms: None,
            server_wait_timeout_ms: 50,
            result_timeout_ms: 200,
        }
    }
}
