//! Types for the trajectory orchestrator.

use serde::{Deserialize, Serialize};

use crate::messages::Path;
use crate::sequence::Failure;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The smoothed path was published.
    Completed { plan: Path },
    Failed { failure: Failure },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Completed { .. } => None,
            Self::Failed { failure } => Some(failure),
        }
    }

    /// Process exit code: 0 on completion, the failure's code otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Completed { .. } => 0,
            Self::Failed { failure } => failure.exit_code(),
        }
    }
}

/// Outcome of a run plus the states it passed through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// State names in the order they were entered, starting with `initializing`.
    pub transitions: Vec<String>,
}
