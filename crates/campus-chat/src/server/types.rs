//! REST API types with schemars annotations for OpenAPI generation

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::HealthStatus;
use crate::events::{Event, EventFilter};
use crate::index::BuildOutcome;

// Base Response Structure
// ======================

/// Envelope shared by every endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BaseResponse<T> {
  pub versioning: VersionInfo,

  /// Transaction ID for logging correlation
  pub transaction_id: Uuid,

  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub errors: Vec<ApiError>,

  #[serde(flatten)]
  pub data: T,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VersionInfo {
  pub latest: String,
  pub requested: String,
  pub resolved: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApiError {
  /// Error key, unique to the error source
  pub key: String,

  /// Human readable error message
  pub message: String,

  #[serde(default)]
  pub context: serde_json::Value,
}

// Status/Version Endpoints
// ========================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StatusResponse {
  pub status: String,
  pub version: String,
  /// Whether an event index is live
  pub index_ready: bool,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VersionResponse {
  pub version: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApiInfoResponse {
  pub latest: String,
  pub versions: ApiVersions,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApiVersions {
  pub latest: String,
  pub active: Vec<String>,
}

// Logs Endpoint
// =============

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct LogsQuery {
  /// Most recent entries to return (default 100)
  pub limit: Option<usize>,
  /// Only entries at this level (`all` disables filtering)
  pub level: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LogsResponse {
  pub logs: Vec<LogEntry>,
}

pub type LogEntry = crier::service_log::LogEntry;

// Chatbot Endpoints
// =================

/// Body of `POST /api/chatbot/chat`
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ChatRequestBody {
  #[serde(default)]
  pub message: String,
}

/// Body of `POST /api/chatbot/upload-and-chat`
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UploadChatRequest {
  #[serde(default)]
  pub message: String,
  /// Base64-encoded image bytes
  #[serde(default)]
  pub image: String,
  /// Original file name, used to check the image type
  #[serde(default)]
  pub filename: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ChatResponseBody {
  pub response: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateIndexResponse {
  pub message: String,
  pub outcome: BuildOutcome,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct HealthResponse {
  pub service: String,
  pub status: String,
  #[serde(flatten)]
  pub health: HealthStatus,
}

// Events Endpoints
// ================

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct EventsQuery {
  #[serde(rename = "type")]
  pub event_type: Option<String>,
  pub subtype: Option<String>,
  pub organization: Option<String>,
  pub limit: Option<usize>,
}

impl EventsQuery {
  pub fn filter(&self) -> EventFilter {
    EventFilter {
      event_type: self.event_type.clone(),
      subtype: self.subtype.clone(),
      organization: self.organization.clone(),
    }
  }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct EventsResponse {
  pub events: Vec<Event>,
  pub count: usize,
}

// Helper Functions
// ================

impl<T> BaseResponse<T> {
  pub fn success(data: T, transaction_id: Uuid) -> Self {
    Self { versioning: VersionInfo::current(), transaction_id, errors: Vec::new(), data }
  }

  pub fn error(errors: Vec<ApiError>, transaction_id: Uuid) -> BaseResponse<()> {
    BaseResponse { versioning: VersionInfo::current(), transaction_id, errors, data: () }
  }
}

impl VersionInfo {
  fn current() -> Self {
    let version = env!("CARGO_PKG_VERSION");
    Self {
      latest: version.to_string(),
      requested: version.to_string(),
      resolved: version.to_string(),
    }
  }
}

impl ApiError {
  pub fn new(key: &str, message: &str) -> Self {
    Self { key: key.to_string(), message: message.to_string(), context: serde_json::Value::Null }
  }
}
