//! Per-request context injected by middleware
//!
//! Every request gets an id and a handle on the service log; start and
//! completion are recorded with method, path, status and duration.

use axum::{
  extract::{Request, State},
  http::{HeaderMap, Method, Uri},
  middleware::Next,
  response::Response,
};
use crier::service_log::{LogContext, ServiceLog};
use crier::Level;
use std::time::Instant;
use uuid::Uuid;

use crate::server::startup::AppState;

#[derive(Clone)]
pub struct RequestContext {
  pub request_id: Uuid,
  pub method: Method,
  pub uri: Uri,
  pub headers: HeaderMap,
  pub logger: ServiceLog,
}

impl RequestContext {
  pub fn new(method: Method, uri: Uri, headers: HeaderMap, logger: ServiceLog) -> Self {
    Self { request_id: Uuid::new_v4(), method, uri, headers, logger }
  }

  pub async fn log_success(&self, message: &str, component: &str) {
    self.log(Level::Success, message, component, None, None).await;
  }

  pub async fn log_warn(&self, message: &str, component: &str) {
    self.log(Level::Warn, message, component, None, None).await;
  }

  pub async fn log_error(&self, message: &str, component: &str) {
    self.log(Level::Error, message, component, None, None).await;
  }

  async fn log(
    &self,
    level: Level,
    message: &str,
    component: &str,
    status_code: Option<u16>,
    duration_ms: Option<f64>,
  ) {
    let context = LogContext {
      request_id: Some(self.request_id.to_string()),
      method: Some(self.method.to_string()),
      path: Some(self.uri.path().to_string()),
      user_agent: self
        .headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string),
      duration_ms,
      status_code,
    };
    self.logger.record_with_context(level, message, component, context).await;
  }

  pub async fn log_request_start(&self) {
    self.log(Level::Info, "Request started", "http-request", None, None).await;
  }

  pub async fn log_request_complete(&self, status_code: u16, duration_ms: f64) {
    let level = if status_code >= 500 { Level::Error } else { Level::Info };
    self
      .log(level, "Request completed", "http-request", Some(status_code), Some(duration_ms))
      .await;
  }
}

/// Inject a `RequestContext` and log the request lifecycle
pub async fn request_context_middleware(
  State(state): State<AppState>,
  mut request: Request,
  next: Next,
) -> Response {
  let context = RequestContext::new(
    request.method().clone(),
    request.uri().clone(),
    request.headers().clone(),
    state.logs.clone(),
  );

  let start_time = Instant::now();
  context.log_request_start().await;

  request.extensions_mut().insert(context.clone());
  let response = next.run(request).await;

  let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
  context.log_request_complete(response.status().as_u16(), duration_ms).await;

  response
}
