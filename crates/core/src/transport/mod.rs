//! Transport abstraction over the middleware.
//!
//! The orchestrator only talks to the planning stack through these traits:
//! - [`ServiceClient`] for request/response calls
//! - [`Publisher`] for fire-and-forget topic publications
//! - [`ActionClient`] for long-running goals (submit, accept, await result)
//!
//! [`crate::bridge::HttpBridge`] implements them against an HTTP gateway;
//! [`crate::testing::MockBridge`] implements them in memory.

mod traits;
mod types;

pub use traits::{
    ActionClient, ActionSpec, PendingResponse, Publisher, ServiceClient, ServiceSpec,
};
pub use types::{
    ComputePathThroughPoses, GoalId, GoalResponse, GoalStatus, SetInitialPose, SmoothPath,
    TransportError,
};
