//! HTTP client for the campus chat REST API

use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use crate::server::types::{
  ApiError, BaseResponse, ChatRequestBody, ChatResponseBody, EventsResponse, HealthResponse,
  LogsResponse, UpdateIndexResponse, UploadChatRequest,
};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5001";

#[derive(Debug, Clone)]
pub struct ClientConfig {
  /// Base URL of the chat server (e.g., "http://127.0.0.1:5001")
  pub base_url: String,
  /// Request timeout in seconds; generous because replies wait on the model
  pub timeout_secs: u64,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self { base_url: DEFAULT_SERVER_URL.to_string(), timeout_secs: 180 }
  }
}

/// Error half of the response envelope
#[derive(Deserialize)]
struct ErrorEnvelope {
  #[serde(default)]
  errors: Vec<ApiError>,
}

pub struct ChatClient {
  client: Client,
  config: ClientConfig,
}

impl Default for ChatClient {
  fn default() -> Self {
    Self::new()
  }
}

impl ChatClient {
  pub fn new() -> Self {
    Self::with_config(ClientConfig::default())
  }

  pub fn with_config(config: ClientConfig) -> Self {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .unwrap_or_else(|_| Client::new());

    Self { client, config }
  }

  fn url(&self, path: &str) -> String {
    format!("{}{path}", self.config.base_url.trim_end_matches('/'))
  }

  async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, action: &str) -> Result<T> {
    let response = timeout(Duration::from_secs(self.config.timeout_secs), request.send()).await??;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await?;
      let detail = serde_json::from_str::<ErrorEnvelope>(&body)
        .ok()
        .and_then(|envelope| envelope.errors.into_iter().next())
        .map(|error| error.message)
        .unwrap_or(body);
      return Err(anyhow!("Failed to {action} ({status}): {detail}"));
    }

    let result: BaseResponse<T> = response.json().await?;
    Ok(result.data)
  }

  pub async fn chat(&self, message: &str) -> Result<String> {
    let request = ChatRequestBody { message: message.to_string() };
    let response: ChatResponseBody = self
      .send(self.client.post(self.url("/api/chatbot/chat")).json(&request), "send message")
      .await?;
    Ok(response.response)
  }

  /// Upload an image file with a question about it
  pub async fn chat_with_image(&self, message: &str, image_path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(image_path)
      .await
      .map_err(|e| anyhow!("Could not read {}: {e}", image_path.display()))?;
    let filename = image_path
      .file_name()
      .map(|name| name.to_string_lossy().to_string())
      .unwrap_or_default();

    let request =
      UploadChatRequest { message: message.to_string(), image: STANDARD.encode(bytes), filename };
    let response: ChatResponseBody = self
      .send(
        self.client.post(self.url("/api/chatbot/upload-and-chat")).json(&request),
        "upload image",
      )
      .await?;
    Ok(response.response)
  }

  pub async fn update_index(&self) -> Result<UpdateIndexResponse> {
    self.send(self.client.post(self.url("/api/chatbot/update-index")), "update index").await
  }

  pub async fn health(&self) -> Result<HealthResponse> {
    self.send(self.client.get(self.url("/api/chatbot/health")), "check health").await
  }

  pub async fn events(
    &self,
    event_type: Option<&str>,
    subtype: Option<&str>,
  ) -> Result<EventsResponse> {
    let mut query: Vec<(&str, &str)> = Vec::new();
    if let Some(event_type) = event_type {
      query.push(("type", event_type));
    }
    if let Some(subtype) = subtype {
      query.push(("subtype", subtype));
    }

    self.send(self.client.get(self.url("/api/events")).query(&query), "list events").await
  }

  pub async fn logs(&self, limit: usize, level: &str) -> Result<LogsResponse> {
    let limit = limit.to_string();
    let query = [("limit", limit.as_str()), ("level", level)];
    self.send(self.client.get(self.url("/logs")).query(&query), "read logs").await
  }
}

/// Client for the server named by `CAMPUS_CHAT_URL`, or the local default
pub fn get_client() -> ChatClient {
  let base_url =
    std::env::var("CAMPUS_CHAT_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
  ChatClient::with_config(ClientConfig { base_url, ..ClientConfig::default() })
}
