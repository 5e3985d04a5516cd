//! Trajectory sequence state machine.
//!
//! The scripted run is modelled as an explicit state advanced only by
//! completion events (acceptance, result, rejection, timeout). Each
//! transition yields at most one [`Command`] for the driver to execute; the
//! command's completion comes back as the next [`SequenceEvent`].
//!
//! ```text
//! Initializing -> AwaitingPathAcceptance -> AwaitingPathResult
//!   -> AwaitingSmoothAcceptance -> AwaitingSmoothResult -> Publishing -> Terminated
//! ```
//!
//! Any waiting state (and `Initializing`, for the startup probe) can fall
//! into the absorbing `Failed` state.

mod events;
mod states;

pub use events::{Command, SequenceEvent, Transition};
pub use states::{Endpoint, Failure, SequenceState};
