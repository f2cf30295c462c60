//! Axum router configuration for all endpoints

use axum::{
  extract::DefaultBodyLimit,
  middleware,
  routing::{get, post},
  Router,
};

use crate::server::handlers::{chatbot, events, logs, status};
use crate::server::middleware::request_context_middleware;
use crate::server::startup::AppState;

/// Base64 inflates the 10 MiB image limit by a third, plus room for the JSON
const UPLOAD_BODY_LIMIT: usize = 16 * 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
  Router::new()
    // Status and version endpoints
    .route("/status", get(status::status))
    .route("/version", get(status::version))
    .route("/api", get(status::api_info))
    .route("/logs", get(logs::get_logs))
    // Chatbot endpoints
    .route("/api/chatbot/chat", post(chatbot::chat))
    .route(
      "/api/chatbot/upload-and-chat",
      post(chatbot::upload_and_chat).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
    )
    .route("/api/chatbot/update-index", post(chatbot::update_index))
    .route("/api/chatbot/health", get(chatbot::health))
    // Read-only event listings
    .route("/api/events", get(events::list_events))
    .route("/api/events/category/{category}", get(events::events_by_category))
    .layer(middleware::from_fn_with_state(state.clone(), request_context_middleware))
    .with_state(state)
}
