//! Types shared by transport implementations.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::messages::{
    ComputePathThroughPosesGoal, ComputePathThroughPosesResult, SetInitialPoseRequest,
    SetInitialPoseResponse, SmoothPathGoal, SmoothPathResult,
};

use super::traits::{ActionSpec, ServiceSpec};

/// Errors that can occur while talking to the middleware.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to encode request: {0}")]
    Encode(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Goal ended without a result: {0}")]
    GoalEnded(String),

    #[error("Publish queue full for {0}")]
    QueueFull(String),

    #[error("Transport closed")]
    Closed,
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::ConnectionFailed(e.to_string())
        } else if e.is_decode() {
            TransportError::Decode(e.to_string())
        } else {
            TransportError::Api {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                message: e.to_string(),
            }
        }
    }
}

/// Client-generated identifier of an action goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalId(Uuid);

impl GoalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GoalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Outcome of the goal submission handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalResponse {
    pub goal_id: GoalId,
    pub accepted: bool,
}

/// Terminal status reported for a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Succeeded,
    Aborted,
    Canceled,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Succeeded => "succeeded",
            GoalStatus::Aborted => "aborted",
            GoalStatus::Canceled => "canceled",
        }
    }
}

/// Sets the localization estimate (`/set_initial_pose`).
pub struct SetInitialPose;

impl ServiceSpec for SetInitialPose {
    type Request = SetInitialPoseRequest;
    type Response = SetInitialPoseResponse;
}

/// Plans a path through an ordered list of poses (`/compute_path_through_poses`).
pub struct ComputePathThroughPoses;

impl ActionSpec for ComputePathThroughPoses {
    type Goal = ComputePathThroughPosesGoal;
    type Result = ComputePathThroughPosesResult;
}

/// Smooths an existing path (`/smooth_path`).
pub struct SmoothPath;

impl ActionSpec for SmoothPath {
    type Goal = SmoothPathGoal;
    type Result = SmoothPathResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_ids_are_unique() {
        assert_ne!(GoalId::new(), GoalId::new());
    }

    #[test]
    fn test_goal_id_serializes_as_plain_uuid() {
        let id = GoalId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }

    #[test]
    fn test_goal_status_wire_names() {
        let status: GoalStatus = serde_json::from_str("\"aborted\"").unwrap();
        assert_eq!(status, GoalStatus::Aborted);
        assert_eq!(GoalStatus::Canceled.as_str(), "canceled");
    }

    #[test]
    fn test_error_display() {
        let err = TransportError::Api {
            status: 503,
            message: "planner busy".to_string(),
        };
        assert_eq!(err.to_string(), "API error (503): planner busy");
    }
}
