//! Wire messages exchanged with the planning stack.
//!
//! Field layout follows the middleware's message definitions so the bridge
//! can forward them without translation:
//! - **geometry**: headers, points, poses and covariance-carrying poses
//! - **people**: tracked people announced to the costmap layers
//! - **nav**: the path artifact plus the service and action payloads

mod geometry;
mod nav;
mod people;

pub use geometry::{
    Header, Point, Pose, PoseStamped, PoseWithCovariance, PoseWithCovarianceStamped, Quaternion,
    Time, Vector3, COVARIANCE_LEN,
};
pub use nav::{
    ComputePathThroughPosesGoal, ComputePathThroughPosesResult, Path, SetInitialPoseRequest,
    SetInitialPoseResponse, SmoothPathGoal, SmoothPathResult,
};
pub use people::{People, Person};
