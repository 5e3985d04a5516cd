//! JSON bodies exchanged with the gateway.

use serde::{Deserialize, Serialize};

use crate::transport::{GoalId, GoalStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Availability {
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct GoalSubmission<G> {
    pub goal_id: GoalId,
    pub goal: G,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct GoalAck {
    pub accepted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct GoalOutcome<R> {
    pub status: GoalStatus,
    /// Absent for goals that did not succeed.
    pub result: Option<R>,
}
