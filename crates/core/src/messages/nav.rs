//! Navigation payloads: the path artifact, the initial pose service and the
//! planning/smoothing actions.

use serde::{Deserialize, Serialize};

use super::geometry::{Header, PoseStamped, PoseWithCovarianceStamped};

/// Sequence of stamped poses produced by the planner.
///
/// The orchestrator never inspects or modifies a path; it is relayed from
/// one operation to the next exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub header: Header,
    pub poses: Vec<PoseStamped>,
}

impl Path {
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetInitialPoseRequest {
    pub pose: PoseWithCovarianceStamped,
}

/// The initial pose service acknowledges with an empty response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetInitialPoseResponse {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputePathThroughPosesGoal {
    /// Waypoints, visited in order.
    pub goals: Vec<PoseStamped>,
    #[serde(default)]
    pub start: PoseStamped,
    #[serde(default)]
    pub planner_id: String,
    /// When false the planner starts from the robot's current pose.
    #[serde(default)]
    pub use_start: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputePathThroughPosesResult {
    pub path: Path,
    /// Planning time in seconds.
    #[serde(default)]
    pub planning_time: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmoothPathGoal {
    pub path: Path,
    #[serde(default)]
    pub smoother_id: String,
    /// Upper bound on smoothing time in seconds.
    #[serde(default)]
    pub max_smoothing_duration: f64,
    #[serde(default)]
    pub check_for_collisions: bool,
}

impl SmoothPathGoal {
    /// Goal wrapping `path` with the server's default smoother.
    pub fn for_path(path: Path) -> Self {
        Self {
            path,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmoothPathResult {
    pub path: Path,
    #[serde(default)]
    pub smoothing_duration: f64,
    #[serde(default)]
    pub was_completed: bool,
}
