//! Transport handles used by a run.

use std::sync::Arc;

use crate::messages::{Path, People};
use crate::transport::{
    ActionClient, ComputePathThroughPoses, Publisher, ServiceClient, SetInitialPose, SmoothPath,
};

/// Every handle the sequence needs, injected by the caller.
///
/// Handles are released when the orchestrator that owns the context is
/// dropped at the end of a run.
#[derive(Clone)]
pub struct OrchestratorContext {
    pub initial_pose: Arc<dyn ServiceClient<SetInitialPose>>,
    pub people: Arc<dyn Publisher<People>>,
    pub compute_path: Arc<dyn ActionClient<ComputePathThroughPoses>>,
    pub smooth_path: Arc<dyn ActionClient<SmoothPath>>,
    pub plan: Arc<dyn Publisher<Path>>,
}

impl std::fmt::Debug for OrchestratorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrchestratorContext")
            .field("initial_pose", &self.initial_pose.name())
            .field("people", &self.people.topic())
            .field("compute_path", &self.compute_path.name())
            .field("smooth_path", &self.smooth_path.name())
            .field("plan", &self.plan.topic())
            .finish()
    }
}
