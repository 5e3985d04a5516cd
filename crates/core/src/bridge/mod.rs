//! HTTP gateway transport.
//!
//! Talks JSON to a middleware gateway exposing services, topics and actions:
//!
//! | Method | Path | Purpose |
//! |---|---|---|
//! | GET  | `/services/{name}` | availability (`{"available": bool}`) |
//! | POST | `/services/{name}/call` | request/response call |
//! | POST | `/topics/{name}` | publish a message |
//! | GET  | `/actions/{name}` | availability (`{"available": bool}`) |
//! | POST | `/actions/{name}/goals` | submit `{goal_id, goal}`, returns `{"accepted": bool}` |
//! | GET  | `/actions/{name}/goals/{goal_id}/result` | long-poll the result |
//!
//! Names are URL-encoded into a single path segment.

mod http;
mod wire;

pub use http::{HttpActionClient, HttpBridge, HttpPublisher, HttpServiceClient};
