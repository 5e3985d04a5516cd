//! Mock transport for testing.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::messages::{
    ComputePathThroughPosesGoal, ComputePathThroughPosesResult, Path, People,
    SetInitialPoseRequest, SetInitialPoseResponse, SmoothPathGoal, SmoothPathResult,
};
use crate::orchestrator::OrchestratorContext;
use crate::sequence::Endpoint;
use crate::transport::{
    ActionClient, ComputePathThroughPoses, GoalId, GoalResponse, PendingResponse, Publisher,
    ServiceClient, SetInitialPose, SmoothPath, TransportError,
};

use super::fixtures;

/// How an accepted goal delivers its result.
#[derive(Debug, Clone)]
pub enum ResultBehavior {
    /// Return this path.
    Succeed(Path),
    /// End the goal without a result.
    Fail(String),
    /// Never complete.
    Never,
}

/// Scripted behavior of one action server.
#[derive(Debug, Clone)]
pub struct ActionBehavior {
    pub available: bool,
    pub accept: bool,
    pub result: ResultBehavior,
    /// Delay before the result is delivered.
    pub result_delay: Duration,
}

impl ActionBehavior {
    /// Available, accepting, and immediately returning `path`.
    pub fn succeed(path: Path) -> Self {
        Self {
            available: true,
            accept: true,
            result: ResultBehavior::Succeed(path),
            result_delay: Duration::ZERO,
        }
    }
}

/// A transport call recorded for test assertions.
#[derive(Debug, Clone)]
pub enum RecordedCall {
    ServiceProbe { timeout: Duration },
    InitialPoseCall(SetInitialPoseRequest),
    PeoplePublished(People),
    ServerProbe { endpoint: Endpoint, timeout: Duration },
    PathGoalSent(ComputePathThroughPosesGoal),
    SmoothGoalSent(SmoothPathGoal),
    ResultRequested { endpoint: Endpoint, goal_id: GoalId },
    PlanPublished(Path),
}

/// Payload-free discriminant of [`RecordedCall`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    ServiceProbe,
    InitialPoseCall,
    PeoplePublished,
    PathServerProbe,
    PathGoalSent,
    PathResultRequested,
    SmoothServerProbe,
    SmoothGoalSent,
    SmoothResultRequested,
    PlanPublished,
}

impl RecordedCall {
    pub fn kind(&self) -> CallKind {
        match self {
            Self::ServiceProbe { .. } => CallKind::ServiceProbe,
            Self::InitialPoseCall(_) => CallKind::InitialPoseCall,
            Self::PeoplePublished(_) => CallKind::PeoplePublished,
            Self::ServerProbe {
                endpoint: Endpoint::SmoothPath,
                ..
            } => CallKind::SmoothServerProbe,
            Self::ServerProbe { .. } => CallKind::PathServerProbe,
            Self::PathGoalSent(_) => CallKind::PathGoalSent,
            Self::SmoothGoalSent(_) => CallKind::SmoothGoalSent,
            Self::ResultRequested {
                endpoint: Endpoint::SmoothPath,
                ..
            } => CallKind::SmoothResultRequested,
            Self::ResultRequested { .. } => CallKind::PathResultRequested,
            Self::PlanPublished(_) => CallKind::PlanPublished,
        }
    }
}

#[derive(Debug)]
struct MockState {
    calls: Vec<RecordedCall>,
    service_available: bool,
    /// Probes still to answer "unavailable" before honoring `service_available`.
    unavailable_probes: usize,
    path: ActionBehavior,
    smooth: ActionBehavior,
    plan_publish_error: bool,
}

/// In-memory implementation of every transport trait.
///
/// Clones share state, so the handles given to an orchestrator and the copy
/// kept by the test observe the same calls.
#[derive(Debug, Clone)]
pub struct MockBridge {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBridge {
    /// Everything available and accepting; the planner returns a path
    /// labelled `planned`, the smoother one labelled `smoothed`.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                calls: Vec::new(),
                service_available: true,
                unavailable_probes: 0,
                path: ActionBehavior::succeed(fixtures::path("planned", 4)),
                smooth: ActionBehavior::succeed(fixtures::path("smoothed", 8)),
                plan_publish_error: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: RecordedCall) {
        self.lock().calls.push(call);
    }

    /// Orchestrator handles backed by this mock.
    pub fn context(&self) -> OrchestratorContext {
        OrchestratorContext {
            initial_pose: Arc::new(self.clone()),
            people: Arc::new(self.clone()),
            compute_path: Arc::new(self.clone()),
            smooth_path: Arc::new(self.clone()),
            plan: Arc::new(self.clone()),
        }
    }

    /// Number of live handles sharing this mock's state, excluding `self`.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.state) - 1
    }

    pub fn set_service_available(&self, available: bool) {
        self.lock().service_available = available;
    }

    /// Answer the next `probes` service probes with "unavailable".
    pub fn set_unavailable_probes(&self, probes: usize) {
        self.lock().unavailable_probes = probes;
    }

    pub fn set_path_behavior(&self, behavior: ActionBehavior) {
        self.lock().path = behavior;
    }

    pub fn set_smooth_behavior(&self, behavior: ActionBehavior) {
        self.lock().smooth = behavior;
    }

    pub fn set_path_result(&self, result: ResultBehavior) {
        self.lock().path.result = result;
    }

    pub fn set_smooth_result(&self, result: ResultBehavior) {
        self.lock().smooth.result = result;
    }

    pub fn set_path_available(&self, available: bool) {
        self.lock().path.available = available;
    }

    pub fn set_smooth_available(&self, available: bool) {
        self.lock().smooth.available = available;
    }

    pub fn reject_path_goals(&self) {
        self.lock().path.accept = false;
    }

    pub fn reject_smooth_goals(&self) {
        self.lock().smooth.accept = false;
    }

    /// Make publishing on the plan topic fail.
    pub fn set_plan_publish_error(&self, fail: bool) {
        self.lock().plan_publish_error = fail;
    }

    /// All recorded calls in invocation order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Kinds of all recorded calls in invocation order.
    pub fn call_kinds(&self) -> Vec<CallKind> {
        self.lock().calls.iter().map(RecordedCall::kind).collect()
    }

    pub fn count(&self, kind: CallKind) -> usize {
        self.lock().calls.iter().filter(|c| c.kind() == kind).count()
    }

    pub fn initial_pose_requests(&self) -> Vec<SetInitialPoseRequest> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                RecordedCall::InitialPoseCall(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn path_goals(&self) -> Vec<ComputePathThroughPosesGoal> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                RecordedCall::PathGoalSent(goal) => Some(goal.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn smooth_goals(&self) -> Vec<SmoothPathGoal> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                RecordedCall::SmoothGoalSent(goal) => Some(goal.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn published_plans(&self) -> Vec<Path> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                RecordedCall::PlanPublished(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    fn behavior(&self, endpoint: Endpoint) -> ActionBehavior {
        let state = self.lock();
        match endpoint {
            Endpoint::SmoothPath => state.smooth.clone(),
            _ => state.path.clone(),
        }
    }

    async fn probe_server(&self, endpoint: Endpoint, timeout: Duration) -> bool {
        self.record(RecordedCall::ServerProbe { endpoint, timeout });
        if self.behavior(endpoint).available {
            return true;
        }
        tokio::time::sleep(timeout).await;
        false
    }

    fn respond_to_goal(&self, endpoint: Endpoint) -> GoalResponse {
        GoalResponse {
            goal_id: GoalId::new(),
            accepted: self.behavior(endpoint).accept,
        }
    }

    async fn result_path(&self, endpoint: Endpoint, goal_id: GoalId) -> Result<Path, TransportError> {
        self.record(RecordedCall::ResultRequested { endpoint, goal_id });
        let behavior = self.behavior(endpoint);
        if !behavior.result_delay.is_zero() {
            tokio::time::sleep(behavior.result_delay).await;
        }

        match behavior.result {
            ResultBehavior::Succeed(path) => Ok(path),
            ResultBehavior::Fail(reason) => Err(TransportError::GoalEnded(reason)),
            ResultBehavior::Never => std::future::pending().await,
        }
    }
}

#[async_trait]
impl ServiceClient<SetInitialPose> for MockBridge {
    fn name(&self) -> &str {
        "/set_initial_pose"
    }

    async fn wait_for_service(&self, timeout: Duration) -> bool {
        self.record(RecordedCall::ServiceProbe { timeout });
        let available = {
            let mut state = self.lock();
            if state.unavailable_probes > 0 {
                state.unavailable_probes -= 1;
                false
            } else {
                state.service_available
            }
        };

        if !available {
            tokio::time::sleep(timeout).await;
        }
        available
    }

    fn call_async(&self, request: SetInitialPoseRequest) -> PendingResponse<SetInitialPoseResponse> {
        self.record(RecordedCall::InitialPoseCall(request));
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(Ok(SetInitialPoseResponse {}));
        rx
    }
}

impl Publisher<People> for MockBridge {
    fn topic(&self) -> &str {
        "/people"
    }

    fn publish(&self, message: &People) -> Result<(), TransportError> {
        self.record(RecordedCall::PeoplePublished(message.clone()));
        Ok(())
    }
}

impl Publisher<Path> for MockBridge {
    fn topic(&self) -> &str {
        "/plan"
    }

    fn publish(&self, message: &Path) -> Result<(), TransportError> {
        if self.lock().plan_publish_error {
            return Err(TransportError::Closed);
        }
        self.record(RecordedCall::PlanPublished(message.clone()));
        Ok(())
    }
}

#[async_trait]
impl ActionClient<ComputePathThroughPoses> for MockBridge {
    fn name(&self) -> &str {
        "/compute_path_through_poses"
    }

    async fn wait_for_server(&self, timeout: Duration) -> bool {
        self.probe_server(Endpoint::ComputePathThroughPoses, timeout)
            .await
    }

    async fn send_goal(
        &self,
        goal: ComputePathThroughPosesGoal,
    ) -> Result<GoalResponse, TransportError> {
        self.record(RecordedCall::PathGoalSent(goal));
        Ok(self.respond_to_goal(Endpoint::ComputePathThroughPoses))
    }

    async fn get_result(
        &self,
        goal_id: &GoalId,
    ) -> Result<ComputePathThroughPosesResult, TransportError> {
        let path = self
            .result_path(Endpoint::ComputePathThroughPoses, *goal_id)
            .await?;
        Ok(ComputePathThroughPosesResult {
            path,
            planning_time: 0.0,
        })
    }
}

#[async_trait]
impl ActionClient<SmoothPath> for MockBridge {
    fn name(&self) -> &str {
        "/smooth_path"
    }

    async fn wait_for_server(&self, timeout: Duration) -> bool {
        self.probe_server(Endpoint::SmoothPath, timeout).await
    }

    async fn send_goal(&self, goal: SmoothPathGoal) -> Result<GoalResponse, TransportError> {
        self.record(RecordedCall::SmoothGoalSent(goal));
        Ok(self.respond_to_goal(Endpoint::SmoothPath))
    }

    async fn get_result(&self, goal_id: &GoalId) -> Result<SmoothPathResult, TransportError> {
        let path = self.result_path(Endpoint::SmoothPath, *goal_id).await?;
        Ok(SmoothPathResult {
            path,
            smoothing_duration: 0.0,
            was_completed: true,
        })
    }
}
