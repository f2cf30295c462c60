//! Runtime configuration for the chat service and its server binary

use clap::Parser;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_CHAT_MODEL: &str = "event-benefits-llama";
pub const DEFAULT_VISION_MODEL: &str = "llava:7b";

/// Everything the chat subsystem needs to talk to its collaborators
#[derive(Debug, Clone)]
pub struct ChatConfig {
  /// Base URL of the Ollama runtime
  pub ollama_base_url: String,
  pub embedding_model: String,
  /// Text-only generation model
  pub chat_model: String,
  /// Multimodal generation model used for images without OCR
  pub vision_model: String,
  /// Directory holding the persisted index snapshot
  pub index_dir: PathBuf,
  /// Maximum snapshot age before a request triggers a rebuild
  pub refresh_interval: Duration,
  /// Upper bound on events fetched per rebuild
  pub fetch_limit: usize,
  /// Number of events retrieved for grounding
  pub search_k: usize,
  pub generation_timeout_secs: u64,
  pub embedding_timeout_secs: u64,
  pub ocr_timeout_secs: u64,
  pub ocr_language: String,
  pub tesseract_bin: String,
}

impl Default for ChatConfig {
  fn default() -> Self {
    Self {
      ollama_base_url: DEFAULT_OLLAMA_URL.to_string(),
      embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
      chat_model: DEFAULT_CHAT_MODEL.to_string(),
      vision_model: DEFAULT_VISION_MODEL.to_string(),
      index_dir: default_data_dir().join("index"),
      refresh_interval: Duration::from_secs(3600),
      fetch_limit: 100,
      search_k: 3,
      generation_timeout_secs: 120,
      embedding_timeout_secs: 30,
      ocr_timeout_secs: 60,
      ocr_language: "eng".to_string(),
      tesseract_bin: "tesseract".to_string(),
    }
  }
}

impl ChatConfig {
  /// Default configuration rooted at a specific data directory
  pub fn with_data_dir(data_dir: &Path) -> Self {
    Self { index_dir: data_dir.join("index"), ..Self::default() }
  }
}

/// Root for all on-disk state (`~/.campus-chat`)
pub fn default_data_dir() -> PathBuf {
  dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp")).join(".campus-chat")
}

/// Command line and environment for `campus_chat_server`
#[derive(Parser, Debug)]
#[command(name = "campus_chat_server")]
#[command(about = "Campus Chat REST API Server")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), ", Smart Student Hub"))]
pub struct ServerArgs {
  /// Server bind address
  #[arg(long, env = "CAMPUS_CHAT_BIND", default_value = "127.0.0.1:5001")]
  pub bind: SocketAddr,

  /// Ollama base URL
  #[arg(long, env = "OLLAMA_BASE_URL", default_value = DEFAULT_OLLAMA_URL)]
  pub ollama_url: String,

  #[arg(long, env = "CAMPUS_CHAT_EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
  pub embedding_model: String,

  #[arg(long, env = "CAMPUS_CHAT_MODEL", default_value = DEFAULT_CHAT_MODEL)]
  pub chat_model: String,

  #[arg(long, env = "CAMPUS_CHAT_VISION_MODEL", default_value = DEFAULT_VISION_MODEL)]
  pub vision_model: String,

  /// JSON catalog of organizations and events
  #[arg(long, env = "CAMPUS_CHAT_EVENTS_FILE")]
  pub events_file: Option<PathBuf>,

  /// Directory for the persisted index snapshot
  #[arg(long, env = "CAMPUS_CHAT_INDEX_DIR")]
  pub index_dir: Option<PathBuf>,

  /// Service log file (JSONL)
  #[arg(long, env = "CAMPUS_CHAT_LOG_FILE")]
  pub log_file: Option<PathBuf>,

  /// Seconds before a live index is considered stale
  #[arg(
    long,
    env = "CAMPUS_CHAT_REFRESH_SECS",
    default_value_t = 3600,
    value_parser = clap::value_parser!(u64).range(1..)
  )]
  pub refresh_secs: u64,

  #[arg(long, env = "CAMPUS_CHAT_GENERATION_TIMEOUT", default_value_t = 120)]
  pub generation_timeout: u64,

  #[arg(long, env = "CAMPUS_CHAT_EMBEDDING_TIMEOUT", default_value_t = 30)]
  pub embedding_timeout: u64,

  #[arg(long, env = "CAMPUS_CHAT_OCR_TIMEOUT", default_value_t = 60)]
  pub ocr_timeout: u64,

  #[arg(long, env = "CAMPUS_CHAT_OCR_LANGUAGE", default_value = "eng")]
  pub ocr_language: String,

  #[arg(long, env = "TESSERACT_BIN", default_value = "tesseract")]
  pub tesseract_bin: String,

  /// Rebuild the index on a timer instead of only on demand
  #[arg(long)]
  pub background_refresh: bool,

  /// Enable verbose logging
  #[arg(short, long)]
  pub verbose: bool,
}

impl ServerArgs {
  pub fn events_file(&self) -> PathBuf {
    self.events_file.clone().unwrap_or_else(|| default_data_dir().join("events.json"))
  }

  pub fn log_file(&self) -> PathBuf {
    self.log_file.clone().unwrap_or_else(|| default_data_dir().join("server.logs.jsonl"))
  }

  pub fn to_config(&self) -> ChatConfig {
    let defaults = ChatConfig::default();
    ChatConfig {
      ollama_base_url: self.ollama_url.trim_end_matches('/').to_string(),
      embedding_model: self.embedding_model.clone(),
      chat_model: self.chat_model.clone(),
      vision_model: self.vision_model.clone(),
      index_dir: self.index_dir.clone().unwrap_or(defaults.index_dir),
      refresh_interval: Duration::from_secs(self.refresh_secs.max(1)),
      generation_timeout_secs: self.generation_timeout,
      embedding_timeout_secs: self.embedding_timeout,
      ocr_timeout_secs: self.ocr_timeout,
      ocr_language: self.ocr_language.clone(),
      tesseract_bin: self.tesseract_bin.clone(),
      ..defaults
    }
  }
}
