//! The single entry point of the chat subsystem
//!
//! `ChatService` owns the event index lifecycle and routes each request to a
//! responder. Replies never fail: every error is turned into text by the
//! responder that hit it. Only an explicit refresh reports errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::classifier::{classify, QueryKind};
use crate::config::ChatConfig;
use crate::error::ChatError;
use crate::events::EventStore;
use crate::index::{BuildOutcome, IndexStats, SnapshotStore, VectorIndex};
use crate::ocr::{TesseractRecognizer, TextRecognizer};
use crate::ollama::{Embedder, Generator, ModelInfo, OllamaClient};
use crate::responders::{FallbackResponder, ImageResponder, RetrievalResponder};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
  pub message: String,
  pub image_path: Option<PathBuf>,
}

impl ChatRequest {
  pub fn text(message: impl Into<String>) -> Self {
    Self { message: message.into(), image_path: None }
  }

  pub fn with_image(message: impl Into<String>, image_path: impl Into<PathBuf>) -> Self {
    Self { message: message.into(), image_path: Some(image_path.into()) }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
  pub text: String,
}

/// Which model serves which capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ModelConfiguration {
  pub embeddings: String,
  pub chat: String,
  pub multimodal: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HealthStatus {
  /// Whether a snapshot is live and searchable
  pub initialized: bool,
  pub last_build_time: Option<DateTime<Utc>>,
  pub index: IndexStats,
  pub models: ModelConfiguration,
  /// Models installed on the runtime; empty when it cannot be reached
  pub available_models: Vec<ModelInfo>,
}

pub struct ChatService {
  config: ChatConfig,
  index: Arc<VectorIndex>,
  events: Arc<dyn EventStore>,
  generator: Arc<dyn Generator>,
  retrieval: RetrievalResponder,
  fallback: FallbackResponder,
  image: ImageResponder,
  initialized: OnceCell<()>,
}

impl ChatService {
  pub fn new(
    config: ChatConfig,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    recognizer: Arc<dyn TextRecognizer>,
    events: Arc<dyn EventStore>,
  ) -> Self {
    let index = Arc::new(VectorIndex::new(
      embedder,
      events.clone(),
      SnapshotStore::new(config.index_dir.clone()),
      config.fetch_limit,
    ));

    let fallback = FallbackResponder::new(generator.clone(), config.chat_model.clone());
    let retrieval = RetrievalResponder::new(
      index.clone(),
      generator.clone(),
      fallback.clone(),
      config.chat_model.clone(),
      config.search_k,
      config.refresh_interval,
    );
    let image = ImageResponder::new(
      generator.clone(),
      recognizer,
      config.chat_model.clone(),
      config.vision_model.clone(),
    );

    Self {
      config,
      index,
      events,
      generator,
      retrieval,
      fallback,
      image,
      initialized: OnceCell::new(),
    }
  }

  /// Production wiring: Ollama for models, tesseract for OCR
  pub fn from_config(config: ChatConfig, events: Arc<dyn EventStore>) -> Self {
    let ollama = Arc::new(OllamaClient::new(&config));
    let recognizer = Arc::new(TesseractRecognizer::new(&config));
    Self::new(config, ollama.clone(), ollama, recognizer, events)
  }

  pub fn config(&self) -> &ChatConfig {
    &self.config
  }

  pub fn index(&self) -> &Arc<VectorIndex> {
    &self.index
  }

  pub fn events(&self) -> &Arc<dyn EventStore> {
    &self.events
  }

  /// Load the persisted index once. Concurrent callers wait for the first.
  pub async fn initialize(&self) {
    self
      .initialized
      .get_or_init(|| async {
        match self.index.load().await {
          Ok(snapshot) => {
            crier::info!("Chat service ready with {} indexed events", snapshot.len());
          }
          Err(ChatError::NotFound { .. }) => {
            crier::info!("Chat service ready, event index will be built on first use");
          }
          Err(e) => {
            crier::warn!("Could not load event index: {e}");
          }
        }
      })
      .await;
  }

  pub async fn get_reply(&self, request: ChatRequest) -> ChatReply {
    self.initialize().await;

    let text = match &request.image_path {
      Some(path) => {
        tracing::debug!(image = %path.display(), "routing to image responder");
        self.image.respond(&request.message, path).await
      }
      None => {
        let kind = classify(&request.message);
        tracing::debug!(?kind, "routing text message");
        match kind {
          QueryKind::EventRelated => self.retrieval.respond(&request.message).await,
          QueryKind::General => self.fallback.respond(&request.message, kind).await,
        }
      }
    };

    ChatReply { text }
  }

  /// Rebuild from the event store now, reporting any failure
  pub async fn force_refresh(&self) -> Result<BuildOutcome, ChatError> {
    self.index.rebuild_from_store().await
  }

  /// Rebuild only if the live snapshot is missing or too old
  pub async fn refresh_if_stale(&self) -> Result<(), ChatError> {
    self.index.ensure_fresh(self.config.refresh_interval).await
  }

  pub async fn health_status(&self) -> HealthStatus {
    let available_models = self.generator.available_models().await.unwrap_or_else(|e| {
      crier::verbose!("Could not list available models: {e}");
      Vec::new()
    });

    HealthStatus {
      initialized: self.index.live().is_some(),
      last_build_time: self.index.last_build_time(),
      index: self.index.stats(),
      models: ModelConfiguration {
        embeddings: self.config.embedding_model.clone(),
        chat: self.config.chat_model.clone(),
        multimodal: self.config.vision_model.clone(),
      },
      available_models,
    }
  }
}
