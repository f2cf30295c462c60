//! HTTP API for the chat service
//!
//! axum router with a request-context middleware that writes every request
//! to the JSONL service log, and schemars-annotated request/response types.

pub mod handlers;
pub mod middleware;
pub mod routing;
pub mod startup;
pub mod types;

pub use routing::create_router;
pub use startup::{start_server, AppState};
