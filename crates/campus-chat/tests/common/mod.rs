//! Fakes for the four collaborators plus a small event catalog
#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use campus_chat::events::EventCatalog;
use campus_chat::index::{SnapshotStore, VectorIndex};
use campus_chat::ocr::TextRecognizer;
use campus_chat::ollama::{Embedder, GenerationRequest, Generator, ModelInfo};
use campus_chat::{ChatConfig, ChatError, ChatService};

pub const GENERATED_REPLY: &str = "Here is what I found for you.";

const VOCABULARY: &[&str] = &[
  "jazz", "music", "night", "career", "fair", "job", "hackathon", "code", "volunteer", "beach",
  "quiz", "hall", "library",
];

/// Bag-of-words embedder with switches for outages and slow calls
pub struct FakeEmbedder {
  pub down: AtomicBool,
  pub calls: AtomicUsize,
  in_flight: AtomicUsize,
  pub max_in_flight: AtomicUsize,
  delay: Duration,
  model: &'static str,
  /// Vectors are cut to this length when set
  width: Option<usize>,
  /// Texts containing this marker embed to the wrong dimension
  short_marker: Mutex<Option<String>>,
}

impl FakeEmbedder {
  pub fn new() -> Self {
    Self::with_delay(Duration::ZERO)
  }

  pub fn with_delay(delay: Duration) -> Self {
    Self {
      down: AtomicBool::new(false),
      calls: AtomicUsize::new(0),
      in_flight: AtomicUsize::new(0),
      max_in_flight: AtomicUsize::new(0),
      delay,
      model: "fake-embed",
      width: None,
      short_marker: Mutex::new(None),
    }
  }

  /// A different embedding model with narrower vectors
  pub fn named(model: &'static str, width: usize) -> Self {
    Self { model, width: Some(width), ..Self::new() }
  }

  pub fn set_down(&self, down: bool) {
    self.down.store(down, Ordering::SeqCst);
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  pub fn max_in_flight(&self) -> usize {
    self.max_in_flight.load(Ordering::SeqCst)
  }

  pub fn shorten_vectors_for(&self, marker: &str) {
    *self.short_marker.lock().unwrap() = Some(marker.to_string());
  }

  pub fn vectorize(text: &str) -> Vec<f32> {
    let lowered = text.to_lowercase();
    let mut vector: Vec<f32> =
      VOCABULARY.iter().map(|word| lowered.matches(word).count() as f32).collect();
    vector.push(0.1);
    vector
  }
}

#[async_trait]
impl Embedder for FakeEmbedder {
  async fn embed(&self, text: &str) -> Result<Vec<f32>, ChatError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if self.down.load(Ordering::SeqCst) {
      return Err(ChatError::EndpointUnreachable {
        endpoint: "/api/embeddings".to_string(),
        message: "connection refused".to_string(),
      });
    }

    let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    if !self.delay.is_zero() {
      tokio::time::sleep(self.delay).await;
    }
    self.in_flight.fetch_sub(1, Ordering::SeqCst);

    let mut vector = Self::vectorize(text);
    if let Some(width) = self.width {
      vector.truncate(width);
    }
    let short = self.short_marker.lock().unwrap().clone();
    if short.is_some_and(|marker| text.contains(&marker)) {
      vector.pop();
    }
    Ok(vector)
  }

  fn model_name(&self) -> &str {
    self.model
  }
}

/// Records every request; replies with a fixed sentence unless down
pub struct RecordingGenerator {
  pub down: AtomicBool,
  pub requests: Mutex<Vec<GenerationRequest>>,
}

impl RecordingGenerator {
  pub fn new() -> Self {
    Self { down: AtomicBool::new(false), requests: Mutex::new(Vec::new()) }
  }

  pub fn set_down(&self, down: bool) {
    self.down.store(down, Ordering::SeqCst);
  }

  pub fn requests(&self) -> Vec<GenerationRequest> {
    self.requests.lock().unwrap().clone()
  }

  pub fn last_prompt(&self) -> Option<String> {
    self.requests.lock().unwrap().last().map(|request| request.prompt.clone())
  }
}

#[async_trait]
impl Generator for RecordingGenerator {
  async fn generate(&self, request: GenerationRequest) -> Result<String, ChatError> {
    self.requests.lock().unwrap().push(request);
    if self.down.load(Ordering::SeqCst) {
      return Err(ChatError::EndpointTimeout { endpoint: "/api/generate".to_string(), seconds: 120 });
    }
    Ok(format!("**{GENERATED_REPLY}**"))
  }

  async fn available_models(&self) -> Result<Vec<ModelInfo>, ChatError> {
    if self.down.load(Ordering::SeqCst) {
      return Err(ChatError::EndpointUnreachable {
        endpoint: "/api/tags".to_string(),
        message: "connection refused".to_string(),
      });
    }
    Ok(vec![ModelInfo { name: "llava:7b".to_string(), size: None, modified_at: None }])
  }
}

/// Returns fixed text (or fails) and remembers which files it was shown
pub struct FakeRecognizer {
  text: Option<String>,
  pub seen: Mutex<Vec<PathBuf>>,
}

impl FakeRecognizer {
  pub fn returning(text: &str) -> Self {
    Self { text: Some(text.to_string()), seen: Mutex::new(Vec::new()) }
  }

  pub fn failing() -> Self {
    Self { text: None, seen: Mutex::new(Vec::new()) }
  }

  pub fn seen(&self) -> Vec<PathBuf> {
    self.seen.lock().unwrap().clone()
  }
}

#[async_trait]
impl TextRecognizer for FakeRecognizer {
  async fn recognize(&self, image_path: &Path) -> Result<String, ChatError> {
    self.seen.lock().unwrap().push(image_path.to_path_buf());
    self
      .text
      .clone()
      .ok_or_else(|| ChatError::Recognition { message: "tesseract exited with status 1".to_string() })
  }
}

pub const CATALOG_JSON: &str = r#"{
  "organizations": [
    {"organizationId": "hku-music", "name": "HKU Music Society", "type": "Student Society"},
    {"organizationId": "hku-careers", "name": "Careers Centre", "type": "University"}
  ],
  "events": [
    {"eventId": "E1", "title": "Jazz Night", "summary": "An evening of live jazz music",
     "date": "2025-03-22", "organization": "hku-music", "type": "Student Event",
     "subtype": "Music", "location": "Loke Yew Hall"},
    {"eventId": "E2", "title": "Career Fair", "summary": "Meet employers and find a job",
     "date": "2025-04-02", "organization": "hku-careers", "type": "University Event",
     "subtype": "Career", "location": "Centennial Campus"},
    {"eventId": "E3", "title": "Campus Hackathon", "summary": "Code for 24 hours",
     "date": "2025-04-12", "organization": "hku-careers", "type": "University Event",
     "subtype": "Technology", "location": "Innovation Wing"},
    {"eventId": "E4", "title": "Beach Cleanup", "summary": "Volunteer at the beach",
     "date": "2025-05-01", "organization": "hku-music", "type": "Student Event",
     "subtype": "Volunteering", "location": "Shek O"},
    {"eventId": "E5", "title": "Pub Quiz", "summary": "Trivia quiz with prizes",
     "date": "2025-05-09", "organization": "hku-music", "type": "Student Event",
     "subtype": "Music", "location": "Student Union"}
  ]
}"#;

pub fn catalog() -> EventCatalog {
  serde_json::from_str(CATALOG_JSON).unwrap()
}

/// Fakes wired to a fresh temp directory
pub struct Harness {
  pub temp: TempDir,
  pub embedder: Arc<FakeEmbedder>,
  pub generator: Arc<RecordingGenerator>,
  pub recognizer: Arc<FakeRecognizer>,
  pub store: Arc<EventCatalog>,
}

impl Harness {
  pub fn new() -> Self {
    Self::with_parts(FakeEmbedder::new(), FakeRecognizer::returning("Lecture 3: Ownership"), catalog())
  }

  pub fn with_parts(
    embedder: FakeEmbedder,
    recognizer: FakeRecognizer,
    store: EventCatalog,
  ) -> Self {
    Self {
      temp: TempDir::new().unwrap(),
      embedder: Arc::new(embedder),
      generator: Arc::new(RecordingGenerator::new()),
      recognizer: Arc::new(recognizer),
      store: Arc::new(store),
    }
  }

  pub fn config(&self) -> ChatConfig {
    ChatConfig::with_data_dir(self.temp.path())
  }

  pub fn service(&self) -> ChatService {
    ChatService::new(
      self.config(),
      self.embedder.clone(),
      self.generator.clone(),
      self.recognizer.clone(),
      self.store.clone(),
    )
  }

  pub fn index(&self) -> VectorIndex {
    self.index_with(self.embedder.clone())
  }

  /// An index over the same directory and store, embedding with `embedder`
  pub fn index_with(&self, embedder: Arc<FakeEmbedder>) -> VectorIndex {
    VectorIndex::new(
      embedder,
      self.store.clone(),
      SnapshotStore::new(self.config().index_dir),
      100,
    )
  }
}
