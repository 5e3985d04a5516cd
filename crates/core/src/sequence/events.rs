//! Events, commands and the transition function.

use crate::messages::Path;
use crate::transport::GoalId;

use super::states::{Endpoint, Failure, SequenceState};

/// Completion notifications that advance the sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceEvent {
    /// Setup steps are done; begin the planning chain.
    Started,
    ServerUnavailable { endpoint: Endpoint },
    GoalAccepted { endpoint: Endpoint, goal_id: GoalId },
    GoalRejected { endpoint: Endpoint },
    ResultReceived {
        endpoint: Endpoint,
        goal_id: GoalId,
        path: Path,
    },
    ResultTimedOut { endpoint: Endpoint, goal_id: GoalId },
    TransportFailed { endpoint: Endpoint, message: String },
    /// The final path was handed to the plan publisher.
    Published,
    Cancelled,
}

impl SequenceEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::ServerUnavailable { .. } => "server_unavailable",
            Self::GoalAccepted { .. } => "goal_accepted",
            Self::GoalRejected { .. } => "goal_rejected",
            Self::ResultReceived { .. } => "result_received",
            Self::ResultTimedOut { .. } => "result_timed_out",
            Self::TransportFailed { .. } => "transport_failed",
            Self::Published => "published",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Work the driver must perform after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Wait for the planner and submit the waypoint goal.
    SubmitPath,
    RequestPathResult(GoalId),
    /// Wait for the smoother and submit the planned path verbatim.
    SubmitSmooth(Path),
    RequestSmoothResult(GoalId),
    PublishPlan(Path),
    /// Release transport handles and end the run.
    Shutdown,
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: SequenceState,
    pub command: Option<Command>,
    /// The event did not belong to the state and was dropped.
    pub ignored: bool,
}

impl Transition {
    fn to(state: SequenceState, command: Command) -> Self {
        Self {
            state,
            command: Some(command),
            ignored: false,
        }
    }

    fn fail(failure: Failure) -> Self {
        Self {
            state: SequenceState::Failed(failure),
            command: None,
            ignored: false,
        }
    }

    fn ignore(state: SequenceState) -> Self {
        Self {
            state,
            command: None,
            ignored: true,
        }
    }
}

impl SequenceState {
    /// Apply `event` to the current state.
    ///
    /// Events for another endpoint, a stale goal id, or any event once the
    /// state is terminal are ignored and leave the state untouched.
    pub fn on_event(self, event: SequenceEvent) -> Transition {
        use Endpoint::{ComputePathThroughPoses as PathEp, SmoothPath as SmoothEp};
        use SequenceEvent as E;
        use SequenceState as S;

        if self.is_terminal() {
            return Transition::ignore(self);
        }

        match (self, event) {
            (_, E::Cancelled) => Transition::fail(Failure::Cancelled),

            (S::Initializing, E::Started) => {
                Transition::to(S::AwaitingPathAcceptance, Command::SubmitPath)
            }
            (
                S::Initializing,
                E::ServerUnavailable {
                    endpoint: endpoint @ Endpoint::SetInitialPose,
                },
            ) => Transition::fail(Failure::EndpointUnavailable { endpoint }),

            (S::AwaitingPathAcceptance, E::GoalAccepted { endpoint: PathEp, goal_id }) => {
                Transition::to(
                    S::AwaitingPathResult { goal_id },
                    Command::RequestPathResult(goal_id),
                )
            }
            (S::AwaitingSmoothAcceptance, E::GoalAccepted { endpoint: SmoothEp, goal_id }) => {
                Transition::to(
                    S::AwaitingSmoothResult { goal_id },
                    Command::RequestSmoothResult(goal_id),
                )
            }

            (
                S::AwaitingPathResult { goal_id: expected },
                E::ResultReceived {
                    endpoint: PathEp,
                    goal_id,
                    path,
                },
            ) if goal_id == expected => {
                Transition::to(S::AwaitingSmoothAcceptance, Command::SubmitSmooth(path))
            }
            (
                S::AwaitingSmoothResult { goal_id: expected },
                E::ResultReceived {
                    endpoint: SmoothEp,
                    goal_id,
                    path,
                },
            ) if goal_id == expected => Transition::to(S::Publishing, Command::PublishPlan(path)),

            (S::Publishing, E::Published) => Transition::to(S::Terminated, Command::Shutdown),

            (state, event) => match (failure_for(&state, &event), state) {
                (Some(failure), _) => Transition::fail(failure),
                (None, state) => Transition::ignore(state),
            },
        }
    }
}

/// Failure caused by `event` in `state`, if the event concerns the endpoint
/// (and goal) the state is waiting on.
fn failure_for(state: &SequenceState, event: &SequenceEvent) -> Option<Failure> {
    let (waiting_on, in_flight) = match state {
        SequenceState::AwaitingPathAcceptance => (Endpoint::ComputePathThroughPoses, None),
        SequenceState::AwaitingPathResult { goal_id } => {
            (Endpoint::ComputePathThroughPoses, Some(*goal_id))
        }
        SequenceState::AwaitingSmoothAcceptance => (Endpoint::SmoothPath, None),
        SequenceState::AwaitingSmoothResult { goal_id } => (Endpoint::SmoothPath, Some(*goal_id)),
        SequenceState::Publishing => (Endpoint::Plan, None),
        _ => return None,
    };

    match event {
        SequenceEvent::ServerUnavailable { endpoint }
            if *endpoint == waiting_on && in_flight.is_none() =>
        {
            Some(Failure::EndpointUnavailable {
                endpoint: *endpoint,
            })
        }
        SequenceEvent::GoalRejected { endpoint }
            if *endpoint == waiting_on && in_flight.is_none() =>
        {
            Some(Failure::GoalRejected {
                endpoint: *endpoint,
            })
        }
        SequenceEvent::ResultTimedOut { endpoint, goal_id }
            if *endpoint == waiting_on && in_flight == Some(*goal_id) =>
        {
            Some(Failure::ResultTimeout {
                endpoint: *endpoint,
            })
        }
        SequenceEvent::TransportFailed { endpoint, message } if *endpoint == waiting_on => {
            Some(Failure::Transport {
                endpoint: *endpoint,
                message: message.clone(),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{Header, PoseStamped};

    fn path(frame: &str, len: usize) -> Path {
        Path {
            header: Header::in_frame(frame),
            poses: vec![PoseStamped::default(); len],
        }
    }

    /// Walk the happy path and return every (state, command) pair.
    fn happy_path() -> Vec<Transition> {
        let path_goal = GoalId::new();
        let smooth_goal = GoalId::new();
        let events = vec![
            SequenceEvent::Started,
            SequenceEvent::GoalAccepted {
                endpoint: Endpoint::ComputePathThroughPoses,
                goal_id: path_goal,
            },
            SequenceEvent::ResultReceived {
                endpoint: Endpoint::ComputePathThroughPoses,
                goal_id: path_goal,
                path: path("p1", 3),
            },
            SequenceEvent::GoalAccepted {
                endpoint: Endpoint::SmoothPath,
                goal_id: smooth_goal,
            },
            SequenceEvent::ResultReceived {
                endpoint: Endpoint::SmoothPath,
                goal_id: smooth_goal,
                path: path("p2", 5),
            },
            SequenceEvent::Published,
        ];

        let mut state = SequenceState::Initializing;
        let mut transitions = Vec::new();
        for event in events {
            let transition = state.on_event(event);
            state = transition.state.clone();
            transitions.push(transition);
        }
        transitions
    }

    #[test]
    fn test_happy_path_visits_states_in_order() {
        let names: Vec<&str> = happy_path().iter().map(|t| t.state.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "awaiting_path_acceptance",
                "awaiting_path_result",
                "awaiting_smooth_acceptance",
                "awaiting_smooth_result",
                "publishing",
                "terminated",
            ]
        );
    }

    #[test]
    fn test_paths_are_relayed_verbatim() {
        let transitions = happy_path();
        assert_eq!(
            transitions[2].command,
            Some(Command::SubmitSmooth(path("p1", 3)))
        );
        assert_eq!(
            transitions[4].command,
            Some(Command::PublishPlan(path("p2", 5)))
        );
        assert_eq!(transitions[5].command, Some(Command::Shutdown));
    }

    #[test]
    fn test_path_rejection_is_terminal() {
        let transition = SequenceState::AwaitingPathAcceptance.on_event(
            SequenceEvent::GoalRejected {
                endpoint: Endpoint::ComputePathThroughPoses,
            },
        );
        assert_eq!(
            transition.state,
            SequenceState::Failed(Failure::GoalRejected {
                endpoint: Endpoint::ComputePathThroughPoses
            })
        );
        assert!(transition.command.is_none());

        let after = transition.state.on_event(SequenceEvent::Started);
        assert!(after.ignored);
        assert!(after.command.is_none());
    }

    #[test]
    fn test_server_unavailable_fails_waiting_step() {
        let transition = SequenceState::AwaitingSmoothAcceptance.on_event(
            SequenceEvent::ServerUnavailable {
                endpoint: Endpoint::SmoothPath,
            },
        );
        assert_eq!(
            transition.state,
            SequenceState::Failed(Failure::EndpointUnavailable {
                endpoint: Endpoint::SmoothPath
            })
        );
    }

    #[test]
    fn test_startup_probe_failure() {
        let transition = SequenceState::Initializing.on_event(SequenceEvent::ServerUnavailable {
            endpoint: Endpoint::SetInitialPose,
        });
        assert_eq!(
            transition.state,
            SequenceState::Failed(Failure::EndpointUnavailable {
                endpoint: Endpoint::SetInitialPose
            })
        );
    }

    #[test]
    fn test_result_timeout_for_current_goal() {
        let goal_id = GoalId::new();
        let transition = SequenceState::AwaitingPathResult { goal_id }.on_event(
            SequenceEvent::ResultTimedOut {
                endpoint: Endpoint::ComputePathThroughPoses,
                goal_id,
            },
        );
        assert_eq!(
            transition.state,
            SequenceState::Failed(Failure::ResultTimeout {
                endpoint: Endpoint::ComputePathThroughPoses
            })
        );
    }

    #[test]
    fn test_stale_goal_result_is_ignored() {
        let goal_id = GoalId::new();
        let state = SequenceState::AwaitingSmoothResult { goal_id };
        let transition = state.clone().on_event(SequenceEvent::ResultReceived {
            endpoint: Endpoint::SmoothPath,
            goal_id: GoalId::new(),
            path: path("stale", 1),
        });
        assert!(transition.ignored);
        assert_eq!(transition.state, state);
        assert!(transition.command.is_none());
    }

    #[test]
    fn test_event_for_other_endpoint_is_ignored() {
        let transition = SequenceState::AwaitingPathAcceptance.on_event(
            SequenceEvent::GoalAccepted {
                endpoint: Endpoint::SmoothPath,
                goal_id: GoalId::new(),
            },
        );
        assert!(transition.ignored);
        assert_eq!(transition.state, SequenceState::AwaitingPathAcceptance);
    }

    #[test]
    fn test_smooth_cannot_start_before_path_result() {
        let goal_id = GoalId::new();
        let transition = SequenceState::AwaitingPathResult { goal_id }.on_event(
            SequenceEvent::GoalAccepted {
                endpoint: Endpoint::SmoothPath,
                goal_id: GoalId::new(),
            },
        );
        assert!(transition.ignored);
        assert!(transition.command.is_none());
    }

    #[test]
    fn test_publish_failure() {
        let transition = SequenceState::Publishing.on_event(SequenceEvent::TransportFailed {
            endpoint: Endpoint::Plan,
            message: "queue closed".to_string(),
        });
        assert_eq!(
            transition.state,
            SequenceState::Failed(Failure::Transport {
                endpoint: Endpoint::Plan,
                message: "queue closed".to_string()
            })
        );
    }

    #[test]
    fn test_cancel_from_any_active_state() {
        let goal_id = GoalId::new();
        for state in [
            SequenceState::Initializing,
            SequenceState::AwaitingPathAcceptance,
            SequenceState::AwaitingPathResult { goal_id },
            SequenceState::AwaitingSmoothResult { goal_id },
            SequenceState::Publishing,
        ] {
            let transition = state.on_event(SequenceEvent::Cancelled);
            assert_eq!(transition.state, SequenceState::Failed(Failure::Cancelled));
        }
    }

    #[test]
    fn test_cancel_after_termination_is_ignored() {
        let transition = SequenceState::Terminated.on_event(SequenceEvent::Cancelled);
        assert!(transition.ignored);
        assert_eq!(transition.state, SequenceState::Terminated);
    }
}
