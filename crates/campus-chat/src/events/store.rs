use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ChatError;
use crate::events::model::{Event, EventCatalog};

/// Optional constraints for an event query (ANDed together)
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct EventFilter {
  #[serde(rename = "type", default)]
  pub event_type: Option<String>,
  #[serde(default)]
  pub subtype: Option<String>,
  /// Organization reference as stored on the event
  #[serde(default)]
  pub organization: Option<String>,
}

/// Read access to the hub's events
#[async_trait]
pub trait EventStore: Send + Sync {
  /// At most `limit` events matching `filter`, organization names populated
  async fn find(&self, filter: &EventFilter, limit: usize) -> Result<Vec<Event>, ChatError>;
}

#[async_trait]
impl EventStore for EventCatalog {
  async fn find(&self, filter: &EventFilter, limit: usize) -> Result<Vec<Event>, ChatError> {
    Ok(EventCatalog::find(self, filter, limit))
  }
}

/// Event store backed by a JSON catalog file, re-read on every query
pub struct JsonEventStore {
  path: PathBuf,
}

impl JsonEventStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  async fn load_catalog(&self) -> Result<EventCatalog, ChatError> {
    let raw = match tokio::fs::read_to_string(&self.path).await {
      Ok(raw) => raw,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        crier::verbose!("No event catalog at {}, treating as empty", self.path.display());
        return Ok(EventCatalog::default());
      }
      Err(e) => {
        return Err(ChatError::EventStore {
          message: format!("reading {}: {e}", self.path.display()),
        })
      }
    };

    serde_json::from_str(&raw).map_err(|e| ChatError::EventStore {
      message: format!("parsing {}: {e}", self.path.display()),
    })
  }
}

#[async_trait]
impl EventStore for JsonEventStore {
  async fn find(&self, filter: &EventFilter, limit: usize) -> Result<Vec<Event>, ChatError> {
    let catalog = self.load_catalog().await?;
    Ok(catalog.find(filter, limit))
  }
}
