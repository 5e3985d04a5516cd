//! Sequence states and failure reasons.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::transport::GoalId;

/// Remote endpoints the sequence depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    SetInitialPose,
    ComputePathThroughPoses,
    SmoothPath,
    Plan,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::SetInitialPose => "SetInitialPose",
            Endpoint::ComputePathThroughPoses => "ComputePathThroughPoses",
            Endpoint::SmoothPath => "SmoothPath",
            Endpoint::Plan => "Plan",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a run ended in [`SequenceState::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Failure {
    /// The endpoint did not report ready within its allotted wait.
    EndpointUnavailable { endpoint: Endpoint },
    /// The action server declined the goal.
    GoalRejected { endpoint: Endpoint },
    /// An accepted goal produced no result before the deadline.
    ResultTimeout { endpoint: Endpoint },
    /// The transport failed while talking to the endpoint.
    Transport { endpoint: Endpoint, message: String },
    /// Shutdown was requested before the run finished.
    Cancelled,
}

impl Failure {
    /// Process exit code reported for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Failure::EndpointUnavailable { .. } => 2,
            Failure::GoalRejected { .. } => 3,
            Failure::ResultTimeout { .. } => 4,
            Failure::Transport { .. } => 5,
            Failure::Cancelled => 130,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::EndpointUnavailable { endpoint } => {
                write!(f, "{} endpoint not available", endpoint)
            }
            Failure::GoalRejected { endpoint } => write!(f, "{} goal was rejected", endpoint),
            Failure::ResultTimeout { endpoint } => {
                write!(f, "{} result did not arrive in time", endpoint)
            }
            Failure::Transport { endpoint, message } => {
                write!(f, "{} transport failure: {}", endpoint, message)
            }
            Failure::Cancelled => write!(f, "cancelled by shutdown request"),
        }
    }
}

/// Position of the run within the scripted sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceState {
    /// Initial pose and people are being sent; no goal submitted yet.
    Initializing,
    AwaitingPathAcceptance,
    AwaitingPathResult { goal_id: GoalId },
    AwaitingSmoothAcceptance,
    AwaitingSmoothResult { goal_id: GoalId },
    /// Smoothed path is being handed to the plan publisher.
    Publishing,
    Terminated,
    Failed(Failure),
}

impl SequenceState {
    /// No further transitions leave a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated | Self::Failed(_))
    }

    /// Whether a remote completion is outstanding in this state.
    pub fn is_awaiting(&self) -> bool {
        matches!(
            self,
            Self::AwaitingPathAcceptance
                | Self::AwaitingPathResult { .. }
                | Self::AwaitingSmoothAcceptance
                | Self::AwaitingSmoothResult { .. }
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::AwaitingPathAcceptance => "awaiting_path_acceptance",
            Self::AwaitingPathResult { .. } => "awaiting_path_result",
            Self::AwaitingSmoothAcceptance => "awaiting_smooth_acceptance",
            Self::AwaitingSmoothResult { .. } => "awaiting_smooth_result",
            Self::Publishing => "publishing",
            Self::Terminated => "terminated",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for SequenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(SequenceState::Terminated.is_terminal());
        assert!(SequenceState::Failed(Failure::Cancelled).is_terminal());
        assert!(!SequenceState::Initializing.is_terminal());
        assert!(!SequenceState::Publishing.is_terminal());
        assert!(!SequenceState::AwaitingPathAcceptance.is_terminal());
    }

    #[test]
    fn test_awaiting_states() {
        let goal_id = GoalId::new();
        assert!(SequenceState::AwaitingPathResult { goal_id }.is_awaiting());
        assert!(SequenceState::AwaitingSmoothAcceptance.is_awaiting());
        assert!(!SequenceState::Initializing.is_awaiting());
        assert!(!SequenceState::Terminated.is_awaiting());
    }

    #[test]
    fn test_exit_codes_are_distinct_and_non_zero() {
        let failures = [
            Failure::EndpointUnavailable {
                endpoint: Endpoint::ComputePathThroughPoses,
            },
            Failure::GoalRejected {
                endpoint: Endpoint::SmoothPath,
            },
            Failure::ResultTimeout {
                endpoint: Endpoint::SmoothPath,
            },
            Failure::Transport {
                endpoint: Endpoint::Plan,
                message: "closed".to_string(),
            },
            Failure::Cancelled,
        ];
        let mut codes: Vec<i32> = failures.iter().map(Failure::exit_code).collect();
        assert!(codes.iter().all(|c| *c != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), failures.len());
    }

    #[test]
    fn test_failure_display() {
        let failure = Failure::GoalRejected {
            endpoint: Endpoint::ComputePathThroughPoses,
        };
        assert_eq!(
            failure.to_string(),
            "ComputePathThroughPoses goal was rejected"
        );
        assert_eq!(
            SequenceState::Failed(failure).to_string(),
            "failed"
        );
    }
}
