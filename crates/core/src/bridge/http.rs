//! reqwest-backed implementation of the transport traits.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::{BridgeConfig, EndpointConfig};
use crate::messages::{Path, People};
use crate::orchestrator::OrchestratorContext;
use crate::transport::{
    ActionClient, ActionSpec, ComputePathThroughPoses, GoalId, GoalResponse, GoalStatus,
    PendingResponse, Publisher, ServiceClient, ServiceSpec, SetInitialPose, SmoothPath,
    TransportError,
};

use super::wire::{Availability, GoalAck, GoalOutcome, GoalSubmission};

/// Shared HTTP state for every handle created from one bridge.
#[derive(Debug)]
struct BridgeInner {
    client: Client,
    base_url: String,
    request_timeout: Duration,
    poll_interval: Duration,
}

impl BridgeInner {
    /// `{base}/{kind}/{encoded name}{suffix}`
    fn url(&self, kind: &str, name: &str, suffix: &str) -> String {
        format!(
            "{}/{}/{}{}",
            self.base_url,
            kind,
            urlencoding::encode(name),
            suffix
        )
    }

    async fn is_available(&self, url: &str) -> Result<bool, TransportError> {
        let availability: Availability = self.get_json(url, Some(self.request_timeout)).await?;
        Ok(availability.available)
    }

    /// Poll `url` until it reports available or `timeout` elapses.
    async fn wait_until_available(&self, url: &str, timeout: Duration) -> bool {
        let probe = async {
            loop {
                match self.is_available(url).await {
                    Ok(true) => return,
                    Ok(false) => {}
                    Err(e) => debug!("Availability probe {} failed: {}", url, e),
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        };
        tokio::time::timeout(timeout, probe).await.is_ok()
    }

    async fn get_json<R: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<R, TransportError> {
        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = error_for_status(request.send().await?).await?;
        response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<Response, TransportError> {
        let response = self
            .client
            .post(url)
            .timeout(self.request_timeout)
            .json(body)
            .send()
            .await?;
        error_for_status(response).await
    }

    async fn post_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<R, TransportError> {
        self.post(url, body)
            .await?
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

async fn error_for_status(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(TransportError::Api {
        status: status.as_u16(),
        message: body.chars().take(200).collect(),
    })
}

/// Factory for gateway-backed transport handles.
#[derive(Debug, Clone)]
pub struct HttpBridge {
    inner: Arc<BridgeInner>,
    /// Delivery tasks of every publisher created from this bridge.
    workers: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl HttpBridge {
    /// Create a new bridge client.
    pub fn new(config: &BridgeConfig) -> Result<Self, TransportError> {
        let request_timeout = Duration::from_secs(config.timeout_secs as u64);
        let client = Client::builder()
            .connect_timeout(request_timeout)
            .build()
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(BridgeInner {
                client,
                base_url: config.url.trim_end_matches('/').to_string(),
                request_timeout,
                poll_interval: Duration::from_millis(config.availability_poll_interval_ms),
            }),
            workers: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn service_client<S: ServiceSpec>(&self, name: impl Into<String>) -> HttpServiceClient<S> {
        HttpServiceClient {
            inner: Arc::clone(&self.inner),
            name: name.into(),
            _marker: PhantomData,
        }
    }

    pub fn action_client<A: ActionSpec>(&self, name: impl Into<String>) -> HttpActionClient<A> {
        HttpActionClient {
            inner: Arc::clone(&self.inner),
            name: name.into(),
            _marker: PhantomData,
        }
    }

    /// Create a publisher with its own delivery task.
    ///
    /// Messages are posted in order; at most `queue_depth` may wait for
    /// delivery. The task exits once the publisher is dropped and its queue
    /// is empty; see [`HttpBridge::shutdown`]. Must be called from within a
    /// tokio runtime.
    pub fn publisher<M: Serialize>(
        &self,
        topic: impl Into<String>,
        queue_depth: usize,
    ) -> HttpPublisher<M> {
        let topic = topic.into();
        let (tx, mut rx) = mpsc::channel::<serde_json::Value>(queue_depth.max(1));
        let inner = Arc::clone(&self.inner);
        let url = inner.url("topics", &topic, "");
        let worker_topic = topic.clone();

        let worker = tokio::spawn(async move {
            while let Some(body) = rx.recv().await {
                match inner.post(&url, &body).await {
                    Ok(_) => debug!("Delivered message to {}", worker_topic),
                    Err(e) => warn!("Failed to publish to {}: {}", worker_topic, e),
                }
            }
            debug!("Publisher for {} closed", worker_topic);
        });
        self.workers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(worker);

        HttpPublisher {
            topic,
            tx,
            _message: PhantomData,
        }
    }

    /// Wait for queued publications to reach the gateway.
    ///
    /// Publishers must already be dropped; each delivery task then drains
    /// its queue and exits. Bounded by the bridge request timeout, after
    /// which the remaining tasks are aborted and `Timeout` is returned.
    pub async fn shutdown(self) -> Result<(), TransportError> {
        let workers = std::mem::take(
            &mut *self
                .workers
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        if workers.is_empty() {
            return Ok(());
        }

        debug!("Draining {} publisher(s)", workers.len());
        let aborts: Vec<_> = workers.iter().map(JoinHandle::abort_handle).collect();
        let drain = async {
            for worker in workers {
                if let Err(e) = worker.await {
                    warn!("Publisher task ended abnormally: {}", e);
                }
            }
        };

        match tokio::time::timeout(self.inner.request_timeout, drain).await {
            Ok(()) => Ok(()),
            Err(_) => {
                warn!("Pending publications not delivered within {:?}", self.inner.request_timeout);
                aborts.iter().for_each(|handle| handle.abort());
                Err(TransportError::Timeout)
            }
        }
    }

    /// Build every handle the orchestrator needs from `endpoints`.
    pub fn context(&self, endpoints: &EndpointConfig) -> OrchestratorContext {
        let depth = endpoints.queue_depth;
        OrchestratorContext {
            initial_pose: Arc::new(
                self.service_client::<SetInitialPose>(endpoints.set_initial_pose.clone()),
            ),
            people: Arc::new(self.publisher::<People>(endpoints.people_topic.clone(), depth)),
            compute_path: Arc::new(self.action_client::<ComputePathThroughPoses>(
                endpoints.compute_path_through_poses.clone(),
            )),
            smooth_path: Arc::new(
                self.action_client::<SmoothPath>(endpoints.smooth_path.clone()),
            ),
            plan: Arc::new(self.publisher::<Path>(endpoints.plan_topic.clone(), depth)),
        }
    }
}

/// Request/response service reached through the gateway.
pub struct HttpServiceClient<S> {
    inner: Arc<BridgeInner>,
    name: String,
    _marker: PhantomData<fn() -> S>,
}

#[async_trait]
impl<S: ServiceSpec> ServiceClient<S> for HttpServiceClient<S> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn wait_for_service(&self, timeout: Duration) -> bool {
        let url = self.inner.url("services", &self.name, "");
        self.inner.wait_until_available(&url, timeout).await
    }

    fn call_async(&self, request: S::Request) -> PendingResponse<S::Response> {
        let (tx, rx) = oneshot::channel();
        let inner = Arc::clone(&self.inner);
        let url = inner.url("services", &self.name, "/call");

        tokio::spawn(async move {
            let response = inner.post_json(&url, &request).await;
            let _ = tx.send(response);
        });

        rx
    }
}

/// Fire-and-forget topic publisher backed by a delivery task.
pub struct HttpPublisher<M> {
    topic: String,
    tx: mpsc::Sender<serde_json::Value>,
    _message: PhantomData<fn(&M)>,
}

impl<M: Serialize> Publisher<M> for HttpPublisher<M> {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn publish(&self, message: &M) -> Result<(), TransportError> {
        let body =
            serde_json::to_value(message).map_err(|e| TransportError::Encode(e.to_string()))?;
        self.tx.try_send(body).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => TransportError::QueueFull(self.topic.clone()),
            mpsc::error::TrySendError::Closed(_) => TransportError::Closed,
        })
    }
}

/// Long-running action reached through the gateway.
pub struct HttpActionClient<A> {
    inner: Arc<BridgeInner>,
    name: String,
    _marker: PhantomData<fn() -> A>,
}

#[async_trait]
impl<A: ActionSpec> ActionClient<A> for HttpActionClient<A> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn wait_for_server(&self, timeout: Duration) -> bool {
        let url = self.inner.url("actions", &self.name, "");
        self.inner.wait_until_available(&url, timeout).await
    }

    async fn send_goal(&self, goal: A::Goal) -> Result<GoalResponse, TransportError> {
        let goal_id = GoalId::new();
        let url = self.inner.url("actions", &self.name, "/goals");
        let ack: GoalAck = self
            .inner
            .post_json(&url, &GoalSubmission { goal_id, goal })
            .await?;

        Ok(GoalResponse {
            goal_id,
            accepted: ack.accepted,
        })
    }

    async fn get_result(&self, goal_id: &GoalId) -> Result<A::Result, TransportError> {
        let url = self
            .inner
            .url("actions", &self.name, &format!("/goals/{}/result", goal_id));
        let outcome: GoalOutcome<A::Result> = self.inner.get_json(&url, None).await?;

        match (outcome.status, outcome.result) {
            (GoalStatus::Succeeded, Some(result)) => Ok(result),
            (GoalStatus::Succeeded, None) => Err(TransportError::Decode(format!(
                "goal {} succeeded without a result",
                goal_id
            ))),
            (status, _) => Err(TransportError::GoalEnded(format!(
                "goal {} {}",
                goal_id,
                status.as_str()
            ))),
        }
    }
}
