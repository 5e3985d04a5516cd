//! Trajectory orchestrator implementation.
//!
//! Startup and setup run inline; the planning chain is driven by an event
//! loop. Each command spawns the remote operation, and the operation's
//! completion comes back over a channel as the next [`SequenceEvent`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::messages::{Path, SmoothPathGoal};
use crate::sequence::{Command, Endpoint, Failure, SequenceEvent, SequenceState};
use crate::transport::{ActionClient, ActionSpec, GoalId};

use super::config::OrchestratorConfig;
use super::context::OrchestratorContext;
use super::scenario::Scenario;
use super::types::{RunOutcome, RunReport};

/// Capacity of the completion event channel.
const EVENT_BUFFER: usize = 16;

/// Drives one scripted trajectory run.
pub struct TrajectoryOrchestrator {
    config: OrchestratorConfig,
    context: OrchestratorContext,
    scenario: Scenario,
    shutdown_rx: Option<broadcast::Receiver<()>>,

    // Runtime state
    state: SequenceState,
    transitions: Vec<String>,
    published: Option<Path>,
    tasks: JoinSet<()>,
}

impl TrajectoryOrchestrator {
    /// Create a new orchestrator.
    pub fn new(config: OrchestratorConfig, context: OrchestratorContext, scenario: Scenario) -> Self {
        Self {
            config,
            context,
            scenario,
            shutdown_rx: None,
            state: SequenceState::Initializing,
            transitions: Vec::new(),
            published: None,
            tasks: JoinSet::new(),
        }
    }

    /// Abort the run (from any non-terminal state) when a message arrives.
    pub fn with_shutdown(mut self, shutdown_rx: broadcast::Receiver<()>) -> Self {
        self.shutdown_rx = Some(shutdown_rx);
        self
    }

    pub fn state(&self) -> &SequenceState {
        &self.state
    }

    /// Execute the sequence to a terminal state.
    ///
    /// Consumes the orchestrator: outstanding operations are aborted and all
    /// transport handles are released before this returns.
    pub async fn run(mut self) -> RunReport {
        info!("Starting trajectory sequence");
        self.transitions.push(self.state.as_str().to_string());

        let (events_tx, mut events_rx) = mpsc::channel(EVENT_BUFFER);

        match self.wait_for_initial_pose_service().await {
            Ok(()) => {
                self.set_initial_pose();
                self.publish_people();
                self.apply(SequenceEvent::Started, &events_tx);
            }
            Err(event) => self.apply(event, &events_tx),
        }

        while !self.state.is_terminal() {
            let event = tokio::select! {
                _ = wait_for_shutdown(&mut self.shutdown_rx) => {
                    if self.state.is_awaiting() {
                        warn!("Shutdown requested while {}, abandoning the goal", self.state);
                    } else {
                        warn!("Shutdown requested while {}", self.state);
                    }
                    SequenceEvent::Cancelled
                }
                event = events_rx.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };
            self.apply(event, &events_tx);
        }

        self.finish()
    }

    /// Block until the initial pose service answers a probe.
    async fn wait_for_initial_pose_service(&mut self) -> Result<(), SequenceEvent> {
        let service = Arc::clone(&self.context.initial_pose);
        let poll_interval = self.config.service_poll_interval();
        let deadline = self
            .config
            .service_wait_timeout()
            .map(|timeout| Instant::now() + timeout);

        loop {
            let ready = tokio::select! {
                _ = wait_for_shutdown(&mut self.shutdown_rx) => {
                    warn!("Shutdown requested while waiting for {}", service.name());
                    return Err(SequenceEvent::Cancelled);
                }
                ready = service.wait_for_service(poll_interval) => ready,
            };

            if ready {
                debug!("{} service available", service.name());
                return Ok(());
            }

            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                error!("{} service not available, giving up", service.name());
                return Err(SequenceEvent::ServerUnavailable {
                    endpoint: Endpoint::SetInitialPose,
                });
            }

            info!("{} service not available, waiting...", service.name());
        }
    }

    /// Dispatch the initial pose without waiting for the acknowledgement.
    fn set_initial_pose(&mut self) {
        let service = &self.context.initial_pose;
        let name = service.name().to_string();
        let request = self.scenario.initial_pose_request();
        let pose = &request.pose.pose;
        debug!(
            "Initial pose variance x={} y={}",
            pose.covariance_at(0, 0),
            pose.covariance_at(1, 1)
        );
        let pending = service.call_async(request);
        info!("Set initial pose called");

        self.tasks.spawn(async move {
            match pending.await {
                Ok(Ok(_)) => debug!("{} acknowledged", name),
                Ok(Err(e)) => warn!("{} call failed: {}", name, e),
                Err(_) => warn!("{} call dropped before responding", name),
            }
        });
    }

    fn publish_people(&self) {
        let message = self.scenario.people_message();
        match self.context.people.publish(&message) {
            Ok(()) => info!("Published people message to {}", self.context.people.topic()),
            Err(e) => warn!("Failed to publish people message: {}", e),
        }
    }

    /// Feed an event to the state machine and run whatever it asks for.
    ///
    /// Commands that complete synchronously produce their follow-up event
    /// directly; the rest report back through `events_tx`.
    fn apply(&mut self, event: SequenceEvent, events_tx: &mpsc::Sender<SequenceEvent>) {
        let mut next = Some(event);

        while let Some(event) = next.take() {
            let event_type = event.event_type();
            let transition = self.state.clone().on_event(event);

            if transition.ignored {
                warn!("Ignoring {} event while {}", event_type, self.state);
                continue;
            }

            if transition.state != self.state {
                debug!("Sequence {} -> {} ({})", self.state, transition.state, event_type);
                self.state = transition.state;
                self.transitions.push(self.state.as_str().to_string());
            }

            if let SequenceState::Failed(failure) = &self.state {
                error!("Trajectory sequence failed: {}", failure);
            }

            if let Some(command) = transition.command {
                next = self.execute(command, events_tx);
            }
        }
    }

    fn execute(
        &mut self,
        command: Command,
        events_tx: &mpsc::Sender<SequenceEvent>,
    ) -> Option<SequenceEvent> {
        let server_timeout = self.config.server_wait_timeout();
        let result_timeout = self.config.result_timeout();

        match command {
            Command::SubmitPath => {
                let client = Arc::clone(&self.context.compute_path);
                let goal = self.scenario.path_goal();
                self.spawn_event(
                    events_tx,
                    submit_goal(client, goal, Endpoint::ComputePathThroughPoses, server_timeout),
                );
                None
            }
            Command::RequestPathResult(goal_id) => {
                let client = Arc::clone(&self.context.compute_path);
                self.spawn_event(
                    events_tx,
                    await_result(
                        client,
                        goal_id,
                        Endpoint::ComputePathThroughPoses,
                        result_timeout,
                        |result| result.path,
                    ),
                );
                None
            }
            Command::SubmitSmooth(path) => {
                info!(
                    "Path computed successfully ({} poses)! Sending to {}",
                    path.len(),
                    self.context.smooth_path.name()
                );
                let client = Arc::clone(&self.context.smooth_path);
                self.spawn_event(
                    events_tx,
                    submit_goal(
                        client,
                        SmoothPathGoal::for_path(path),
                        Endpoint::SmoothPath,
                        server_timeout,
                    ),
                );
                None
            }
            Command::RequestSmoothResult(goal_id) => {
                let client = Arc::clone(&self.context.smooth_path);
                self.spawn_event(
                    events_tx,
                    await_result(
                        client,
                        goal_id,
                        Endpoint::SmoothPath,
                        result_timeout,
                        |result| result.path,
                    ),
                );
                None
            }
            Command::PublishPlan(path) => {
                let topic = self.context.plan.topic().to_string();
                info!("Path smoothed successfully! Publishing to {}", topic);
                match self.context.plan.publish(&path) {
                    Ok(()) => {
                        info!("Smoothed path published to {}", topic);
                        self.published = Some(path);
                        Some(SequenceEvent::Published)
                    }
                    Err(e) => Some(SequenceEvent::TransportFailed {
                        endpoint: Endpoint::Plan,
                        message: e.to_string(),
                    }),
                }
            }
            Command::Shutdown => {
                info!("Shutting down the node");
                None
            }
        }
    }

    /// Run `operation` in the background and post its event when done.
    fn spawn_event<F>(&mut self, events_tx: &mpsc::Sender<SequenceEvent>, operation: F)
    where
        F: Future<Output = SequenceEvent> + Send + 'static,
    {
        let events_tx = events_tx.clone();
        self.tasks.spawn(async move {
            let event = operation.await;
            if events_tx.send(event).await.is_err() {
                debug!("Sequence ended before completion event was delivered");
            }
        });
    }

    fn finish(mut self) -> RunReport {
        self.tasks.abort_all();

        let outcome = match std::mem::replace(&mut self.state, SequenceState::Terminated) {
            SequenceState::Failed(failure) => RunOutcome::Failed { failure },
            _ => match self.published.take() {
                Some(plan) => RunOutcome::Completed { plan },
                None => RunOutcome::Failed {
                    failure: Failure::Cancelled,
                },
            },
        };

        info!("Destroying node and shutting down");
        RunReport {
            outcome,
            transitions: std::mem::take(&mut self.transitions),
        }
    }
}

/// Resolve once a shutdown message arrives; never resolves without a receiver.
async fn wait_for_shutdown(shutdown_rx: &mut Option<broadcast::Receiver<()>>) {
    let Some(rx) = shutdown_rx else {
        return std::future::pending().await;
    };

    match rx.recv().await {
        Ok(()) | Err(RecvError::Lagged(_)) => {}
        // Sender gone: no shutdown can be requested any more.
        Err(RecvError::Closed) => std::future::pending().await,
    }
}

/// Wait for the action server, submit `goal`, and report the handshake.
async fn submit_goal<A: ActionSpec>(
    client: Arc<dyn ActionClient<A>>,
    goal: A::Goal,
    endpoint: Endpoint,
    server_timeout: Duration,
) -> SequenceEvent {
    if !client.wait_for_server(server_timeout).await {
        error!("{} action server not available!", client.name());
        return SequenceEvent::ServerUnavailable { endpoint };
    }

    info!("Sending goal to {}", client.name());
    match client.send_goal(goal).await {
        Ok(response) if response.accepted => {
            info!("{} goal accepted!", endpoint);
            SequenceEvent::GoalAccepted {
                endpoint,
                goal_id: response.goal_id,
            }
        }
        Ok(_) => {
            error!("{} goal was rejected!", endpoint);
            SequenceEvent::GoalRejected { endpoint }
        }
        Err(e) => {
            error!("Failed to send {} goal: {}", endpoint, e);
            SequenceEvent::TransportFailed {
                endpoint,
                message: e.to_string(),
            }
        }
    }
}

/// Wait (bounded) for the result of an accepted goal.
async fn await_result<A: ActionSpec>(
    client: Arc<dyn ActionClient<A>>,
    goal_id: GoalId,
    endpoint: Endpoint,
    result_timeout: Duration,
    into_path: fn(A::Result) -> Path,
) -> SequenceEvent {
    match tokio::time::timeout(result_timeout, client.get_result(&goal_id)).await {
        Ok(Ok(result)) => SequenceEvent::ResultReceived {
            endpoint,
            goal_id,
            path: into_path(result),
        },
        Ok(Err(e)) => {
            error!("{} result for goal {} failed: {}", endpoint, goal_id, e);
            SequenceEvent::TransportFailed {
                endpoint,
                message: e.to_string(),
            }
        }
        Err(_) => {
            error!(
                "{} result for goal {} not received within {:?}",
                endpoint, goal_id, result_timeout
            );
            SequenceEvent::ResultTimedOut { endpoint, goal_id }
        }
    }
}
