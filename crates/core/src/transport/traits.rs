//! Trait definitions for the transport module.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::oneshot;

use super::types::{GoalId, GoalResponse, TransportError};

/// Receiver for the deferred response of a dispatched service call.
pub type PendingResponse<T> = oneshot::Receiver<Result<T, TransportError>>;

/// Ties a service's request type to its response type.
pub trait ServiceSpec: Send + Sync + 'static {
    type Request: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;
    type Response: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;
}

/// Ties an action's goal type to its result type.
pub trait ActionSpec: Send + Sync + 'static {
    type Goal: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;
    type Result: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;
}

/// Client side of a request/response service.
#[async_trait]
pub trait ServiceClient<S: ServiceSpec>: Send + Sync {
    /// Service name as known to the middleware.
    fn name(&self) -> &str;

    /// Wait up to `timeout` for the service to become available.
    async fn wait_for_service(&self, timeout: Duration) -> bool;

    /// Dispatch a call without waiting for it.
    ///
    /// The request is handed to the transport before this returns; the
    /// response (or error) is delivered through the returned receiver.
    fn call_async(&self, request: S::Request) -> PendingResponse<S::Response>;

    /// Call the service and wait for its response.
    async fn call(&self, request: S::Request) -> Result<S::Response, TransportError> {
        self.call_async(request)
            .await
            .map_err(|_| TransportError::Closed)?
    }
}

/// One-way topic publisher.
pub trait Publisher<M>: Send + Sync {
    /// Topic name as known to the middleware.
    fn topic(&self) -> &str;

    /// Hand the message to the transport without waiting for delivery.
    fn publish(&self, message: &M) -> Result<(), TransportError>;
}

/// Client side of a long-running action.
#[async_trait]
pub trait ActionClient<A: ActionSpec>: Send + Sync {
    /// Action name as known to the middleware.
    fn name(&self) -> &str;

    /// Wait up to `timeout` for the action server to become available.
    async fn wait_for_server(&self, timeout: Duration) -> bool;

    /// Submit a goal and wait for the server's accept/reject decision.
    async fn send_goal(&self, goal: A::Goal) -> Result<GoalResponse, TransportError>;

    /// Wait for the result of a previously accepted goal.
    ///
    /// There is no deadline here; callers wrap this in their own timeout.
    async fn get_result(&self, goal_id: &GoalId) -> Result<A::Result, TransportError>;
}
