//! Client for the local Ollama runtime
//!
//! Exposes the two capabilities the chat subsystem consumes, embedding and
//! non-streaming generation, as traits so responders and the index can be
//! driven by fakes in tests.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ChatConfig;
use crate::error::ChatError;

const EMBEDDINGS_PATH: &str = "/api/embeddings";
const GENERATE_PATH: &str = "/api/generate";
const TAGS_PATH: &str = "/api/tags";
const TAGS_TIMEOUT_SECS: u64 = 5;

/// Turns text into a fixed-length vector
#[async_trait]
pub trait Embedder: Send + Sync {
  async fn embed(&self, text: &str) -> Result<Vec<f32>, ChatError>;

  /// Model identifier recorded in snapshots and health output
  fn model_name(&self) -> &str;
}

/// A single non-streaming generation call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
  pub model: String,
  pub prompt: String,
  /// Base64-encoded images for multimodal models
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub images: Vec<String>,
}

impl GenerationRequest {
  pub fn text(model: &str, prompt: impl Into<String>) -> Self {
    Self { model: model.to_string(), prompt: prompt.into(), images: Vec::new() }
  }

  pub fn with_images(model: &str, prompt: impl Into<String>, images: Vec<String>) -> Self {
    Self { model: model.to_string(), prompt: prompt.into(), images }
  }
}

/// A model installed on the runtime, as reported by `/api/tags`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ModelInfo {
  pub name: String,
  #[serde(default)]
  pub size: Option<u64>,
  #[serde(default)]
  pub modified_at: Option<String>,
}

/// Produces text from a prompt (and optional images)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Generator: Send + Sync {
  async fn generate(&self, request: GenerationRequest) -> Result<String, ChatError>;

  async fn available_models(&self) -> Result<Vec<ModelInfo>, ChatError>;
}

// Wire types
// ==========

#[derive(Serialize)]
struct EmbeddingsBody<'a> {
  model: &'a str,
  prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsReply {
  #[serde(default)]
  embedding: Vec<f32>,
}

#[derive(Serialize)]
struct GenerateBody<'a> {
  #[serde(flatten)]
  request: &'a GenerationRequest,
  stream: bool,
}

#[derive(Deserialize)]
struct GenerateReply {
  response: String,
}

#[derive(Deserialize)]
struct TagsReply {
  #[serde(default)]
  models: Vec<ModelInfo>,
}

// Client
// ======

/// HTTP client for a single Ollama instance
#[derive(Clone)]
pub struct OllamaClient {
  client: Client,
  base_url: String,
  embedding_model: String,
  generation_timeout_secs: u64,
  embedding_timeout_secs: u64,
}

impl OllamaClient {
  pub fn new(config: &ChatConfig) -> Self {
    Self {
      client: Client::new(),
      base_url: config.ollama_base_url.trim_end_matches('/').to_string(),
      embedding_model: config.embedding_model.clone(),
      generation_timeout_secs: config.generation_timeout_secs,
      embedding_timeout_secs: config.embedding_timeout_secs,
    }
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  /// Send a request with a bounded timeout and decode its JSON body
  async fn send_json<T: for<'de> Deserialize<'de>>(
    &self,
    path: &str,
    builder: RequestBuilder,
    timeout_secs: u64,
  ) -> Result<T, ChatError> {
    let response = builder
      .timeout(Duration::from_secs(timeout_secs))
      .send()
      .await
      .map_err(|e| map_transport_error(path, timeout_secs, e))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(ChatError::MalformedResponse {
        endpoint: path.to_string(),
        message: format!("status {status}: {}", body.trim()),
      });
    }

    response.json::<T>().await.map_err(|e| {
      if e.is_timeout() {
        map_transport_error(path, timeout_secs, e)
      } else {
        ChatError::MalformedResponse { endpoint: path.to_string(), message: e.to_string() }
      }
    })
  }
}

fn map_transport_error(endpoint: &str, timeout_secs: u64, error: reqwest::Error) -> ChatError {
  if error.is_timeout() {
    ChatError::EndpointTimeout { endpoint: endpoint.to_string(), seconds: timeout_secs }
  } else {
    ChatError::EndpointUnreachable { endpoint: endpoint.to_string(), message: error.to_string() }
  }
}

#[async_trait]
impl Embedder for OllamaClient {
  async fn embed(&self, text: &str) -> Result<Vec<f32>, ChatError> {
    let body = EmbeddingsBody { model: &self.embedding_model, prompt: text };
    let builder = self.client.post(self.url(EMBEDDINGS_PATH)).json(&body);
    let reply: EmbeddingsReply =
      self.send_json(EMBEDDINGS_PATH, builder, self.embedding_timeout_secs).await?;

    if reply.embedding.is_empty() {
      return Err(ChatError::MalformedResponse {
        endpoint: EMBEDDINGS_PATH.to_string(),
        message: "empty embedding".to_string(),
      });
    }
    Ok(reply.embedding)
  }

  fn model_name(&self) -> &str {
    &self.embedding_model
  }
}

#[async_trait]
impl Generator for OllamaClient {
  async fn generate(&self, request: GenerationRequest) -> Result<String, ChatError> {
    let body = GenerateBody { request: &request, stream: false };
    let builder = self.client.post(self.url(GENERATE_PATH)).json(&body);
    let reply: GenerateReply =
      self.send_json(GENERATE_PATH, builder, self.generation_timeout_secs).await?;
    Ok(reply.response)
  }

  async fn available_models(&self) -> Result<Vec<ModelInfo>, ChatError> {
    let builder = self.client.get(self.url(TAGS_PATH));
    let reply: TagsReply = self.send_json(TAGS_PATH, builder, TAGS_TIMEOUT_SECS).await?;
    Ok(reply.models)
  }
}
