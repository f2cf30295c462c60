//! Persistent, structured logs for the HTTP service
//!
//! Entries are appended to a JSONL file behind an async mutex, and mirrored to
//! the console unless the log was opened in silent mode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

#[cfg(feature = "schemars")]
use schemars::JsonSchema;

use crate::Level;

// Types
// =====

/// Request context attached to a log entry
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
pub struct LogContext {
  /// Request ID for correlation
  #[serde(skip_serializing_if = "Option::is_none")]
  pub request_id: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub method: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub path: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub user_agent: Option<String>,

  /// Request duration in milliseconds
  #[serde(skip_serializing_if = "Option::is_none")]
  pub duration_ms: Option<f64>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub status_code: Option<u16>,
}

/// A single JSONL line
#[derive(Debug, Serialize, Deserialize, Clone)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
pub struct LogEntry {
  pub timestamp: DateTime<Utc>,
  pub level: String,
  pub message: String,
  pub component: String,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub context: Option<LogContext>,
}

struct ServiceLogInner {
  path: PathBuf,
  silent: bool,
}

/// Thread-safe JSONL log shared by every request handler
#[derive(Clone)]
pub struct ServiceLog {
  inner: Arc<Mutex<ServiceLogInner>>,
}

// File Operations
// ===============

impl ServiceLogInner {
  fn open(path: &Path, silent: bool) -> std::io::Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    // Never truncate an existing log
    if !path.exists() {
      File::create(path)?;
    }

    Ok(Self { path: path.to_path_buf(), silent })
  }

  fn append(&self, entry: &LogEntry) -> std::io::Result<()> {
    let line = serde_json::to_string(entry)
      .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
    writeln!(file, "{line}")?;
    file.flush()
  }

  /// Most recent `limit` entries, oldest first
  fn read(&self, limit: Option<usize>, level_filter: Option<&str>) -> std::io::Result<Vec<LogEntry>> {
    if !self.path.exists() {
      return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(&self.path)?);
    let mut entries = Vec::new();

    for line in reader.lines() {
      let line = line?;
      if line.trim().is_empty() {
        continue;
      }

      // Skip malformed lines
      let Ok(entry) = serde_json::from_str::<LogEntry>(&line) else {
        continue;
      };

      if level_filter.is_none_or(|filter| filter == "all" || entry.level == filter) {
        entries.push(entry);
      }
    }

    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    if let Some(limit) = limit {
      entries.truncate(limit);
    }
    entries.reverse();

    Ok(entries)
  }
}

// Core API
// ========

impl ServiceLog {
  pub fn new<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
    Self::new_with_silent(path, false)
  }

  /// Open a log that only writes to disk
  pub fn new_with_silent<P: AsRef<Path>>(path: P, silent: bool) -> std::io::Result<Self> {
    let inner = ServiceLogInner::open(path.as_ref(), silent)?;
    Ok(Self { inner: Arc::new(Mutex::new(inner)) })
  }

  /// Append an entry, returning any I/O error
  pub async fn add_log(
    &self,
    level: Level,
    message: &str,
    component: &str,
    context: Option<LogContext>,
  ) -> std::io::Result<()> {
    let entry = LogEntry {
      timestamp: Utc::now(),
      level: level.as_str().to_string(),
      message: message.to_string(),
      component: component.to_string(),
      context,
    };

    let guard = self.inner.lock().await;
    guard.append(&entry)?;
    if !guard.silent {
      crate::emit(level, message);
    }
    Ok(())
  }

  /// Append an entry, ignoring write failures
  pub async fn record(&self, level: Level, message: &str, component: &str) {
    let _ = self.add_log(level, message, component, None).await;
  }

  pub async fn record_with_context(
    &self,
    level: Level,
    message: &str,
    component: &str,
    context: LogContext,
  ) {
    let _ = self.add_log(level, message, component, Some(context)).await;
  }

  pub async fn get_logs(
    &self,
    limit: Option<usize>,
    level_filter: Option<&str>,
  ) -> std::io::Result<Vec<LogEntry>> {
    let guard = self.inner.lock().await;
    guard.read(limit, level_filter)
  }

  pub async fn log_file_path(&self) -> PathBuf {
    self.inner.lock().await.path.clone()
  }
}

// Level Wrappers
// ==============

impl ServiceLog {
  pub async fn info(&self, message: &str, component: &str) {
    self.record(Level::Info, message, component).await;
  }

  pub async fn success(&self, message: &str, component: &str) {
    self.record(Level::Success, message, component).await;
  }

  pub async fn warn(&self, message: &str, component: &str) {
    self.record(Level::Warn, message, component).await;
  }

  pub async fn error(&self, message: &str, component: &str) {
    self.record(Level::Error, message, component).await;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;

  fn temp_log_path() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("service.log");
    (temp_dir, log_path)
  }

  #[tokio::test]
  async fn test_new_creates_file_and_parents() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("nested").join("deep").join("service.log");

    let logs = ServiceLog::new_with_silent(&nested, true).unwrap();

    assert!(nested.exists());
    assert_eq!(logs.log_file_path().await, nested);
  }

  #[tokio::test]
  async fn test_add_log_writes_jsonl_line() {
    let (_temp_dir, log_path) = temp_log_path();
    let logs = ServiceLog::new_with_silent(&log_path, true).unwrap();

    logs.add_log(Level::Info, "Index loaded", "chat-index", None).await.unwrap();

    let content = fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = content.trim().split('\n').collect();
    assert_eq!(lines.len(), 1);

    let entry: LogEntry = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(entry.message, "Index loaded");
    assert_eq!(entry.level, "info");
    assert_eq!(entry.component, "chat-index");
    assert!(entry.context.is_none());
  }

  #[tokio::test]
  async fn test_context_is_persisted() {
    let (_temp_dir, log_path) = temp_log_path();
    let logs = ServiceLog::new_with_silent(&log_path, true).unwrap();

    let context = LogContext {
      request_id: Some("abc".to_string()),
      method: Some("POST".to_string()),
      path: Some("/api/chatbot/chat".to_string()),
      status_code: Some(200),
      ..Default::default()
    };
    logs.record_with_context(Level::Info, "Request completed", "http-request", context).await;

    let result = logs.get_logs(None, None).await.unwrap();
    let context = result[0].context.as_ref().unwrap();
    assert_eq!(context.request_id.as_deref(), Some("abc"));
    assert_eq!(context.status_code, Some(200));
    assert!(context.user_agent.is_none());
  }

  #[tokio::test]
  async fn test_get_logs_filters_by_level() {
    let (_temp_dir, log_path) = temp_log_path();
    let logs = ServiceLog::new_with_silent(&log_path, true).unwrap();

    logs.info("Info message", "comp").await;
    logs.warn("Warn message", "comp").await;
    logs.error("Error message", "comp").await;
    logs.success("Success message", "comp").await;

    let warn_logs = logs.get_logs(None, Some("warn")).await.unwrap();
    assert_eq!(warn_logs.len(), 1);
    assert_eq!(warn_logs[0].message, "Warn message");

    let all_logs = logs.get_logs(None, Some("all")).await.unwrap();
    assert_eq!(all_logs.len(), 4);
  }

  #[tokio::test]
  async fn test_get_logs_with_limit() {
    let (_temp_dir, log_path) = temp_log_path();
    let logs = ServiceLog::new_with_silent(&log_path, true).unwrap();

    for i in 1..=5 {
      logs.add_log(Level::Info, &format!("Message {i}"), "comp", None).await.unwrap();
    }

    assert_eq!(logs.get_logs(Some(3), None).await.unwrap().len(), 3);
    assert_eq!(logs.get_logs(Some(0), None).await.unwrap().len(), 0);
    assert_eq!(logs.get_logs(Some(10), None).await.unwrap().len(), 5);
  }

  #[tokio::test]
  async fn test_get_logs_skips_malformed_lines() {
    let (_temp_dir, log_path) = temp_log_path();

    fs::write(
      &log_path,
      r#"{"timestamp":"2024-01-01T12:00:00Z","level":"info","message":"Valid","component":"test"}
invalid json line
{"timestamp":"2024-01-01T12:01:00Z","level":"warn","message":"Also valid","component":"test"}
"#,
    )
    .unwrap();

    let logs = ServiceLog::new_with_silent(&log_path, true).unwrap();
    let result = logs.get_logs(None, None).await.unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result[0].message, "Valid");
    assert_eq!(result[1].message, "Also valid");
  }

  #[tokio::test]
  async fn test_get_logs_missing_file_is_empty() {
    let (_temp_dir, log_path) = temp_log_path();
    let logs = ServiceLog::new_with_silent(&log_path, true).unwrap();
    fs::remove_file(&log_path).unwrap();

    assert!(logs.get_logs(None, None).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_concurrent_writes() {
    let (_temp_dir, log_path) = temp_log_path();
    let logs = ServiceLog::new_with_silent(&log_path, true).unwrap();

    let mut handles = vec![];
    for i in 0..10 {
      let logs = logs.clone();
      handles.push(tokio::spawn(async move {
        logs.add_log(Level::Info, &format!("Message {i}"), "concurrent", None).await.unwrap();
      }));
    }
    for handle in handles {
      handle.await.unwrap();
    }

    let result = logs.get_logs(None, None).await.unwrap();
    assert_eq!(result.len(), 10);
    assert!(result.iter().all(|e| e.component == "concurrent"));
  }
}
