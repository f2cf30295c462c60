//! Semantic index over campus events
//!
//! The live index is an immutable [`VectorIndexSnapshot`] behind an `Arc`.
//! Builds assemble a complete replacement off to the side, persist it, and
//! only then swap it in, so readers always see either the old snapshot or the
//! new one. At most one build runs at a time.

pub mod similarity;
pub mod snapshot;
pub mod storage;

pub use similarity::cosine_similarity;
pub use snapshot::{IndexedVector, SearchHit, VectorIndexSnapshot};
pub use storage::SnapshotStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::ChatError;
use crate::events::{EventDocument, EventFilter, EventStore};
use crate::ollama::Embedder;

/// Result of asking for a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildOutcome {
  /// A new snapshot with this many documents is live
  Built { documents: usize },
  /// Another build held the flag, nothing was done
  AlreadyRunning,
  /// The store returned no events, the live snapshot was left alone
  NoEvents,
}

/// Counters describing the index since startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct IndexStats {
  /// Entries in the live snapshot
  pub documents: usize,
  /// Persisted snapshots read from disk
  pub loads: usize,
  /// Successful builds
  pub builds: usize,
}

/// Clears the build flag on every exit path, including early `?` returns
struct BuildGuard<'a> {
  flag: &'a AtomicBool,
}

impl Drop for BuildGuard<'_> {
  fn drop(&mut self) {
    self.flag.store(false, Ordering::Release);
  }
}

pub struct VectorIndex {
  embedder: Arc<dyn Embedder>,
  events: Arc<dyn EventStore>,
  storage: SnapshotStore,
  fetch_limit: usize,
  live: RwLock<Option<Arc<VectorIndexSnapshot>>>,
  building: AtomicBool,
  loads: AtomicUsize,
  builds: AtomicUsize,
}

impl VectorIndex {
  pub fn new(
    embedder: Arc<dyn Embedder>,
    events: Arc<dyn EventStore>,
    storage: SnapshotStore,
    fetch_limit: usize,
  ) -> Self {
    Self {
      embedder,
      events,
      storage,
      fetch_limit,
      live: RwLock::new(None),
      building: AtomicBool::new(false),
      loads: AtomicUsize::new(0),
      builds: AtomicUsize::new(0),
    }
  }

  // Snapshot access
  // ===============

  /// The snapshot searches currently run against
  pub fn live(&self) -> Option<Arc<VectorIndexSnapshot>> {
    match self.live.read() {
      Ok(guard) => guard.clone(),
      Err(poisoned) => poisoned.into_inner().clone(),
    }
  }

  pub fn last_build_time(&self) -> Option<DateTime<Utc>> {
    self.live().map(|snapshot| snapshot.built_at)
  }

  pub fn stats(&self) -> IndexStats {
    IndexStats {
      documents: self.live().map(|snapshot| snapshot.len()).unwrap_or(0),
      loads: self.loads.load(Ordering::Relaxed),
      builds: self.builds.load(Ordering::Relaxed),
    }
  }

  pub fn is_building(&self) -> bool {
    self.building.load(Ordering::Acquire)
  }

  fn install(&self, snapshot: Arc<VectorIndexSnapshot>) {
    let mut guard = match self.live.write() {
      Ok(guard) => guard,
      Err(poisoned) => poisoned.into_inner(),
    };
    *guard = Some(snapshot);
  }

  /// Install unless something newer is already live
  fn install_if_newer(&self, snapshot: Arc<VectorIndexSnapshot>) -> Arc<VectorIndexSnapshot> {
    let mut guard = match self.live.write() {
      Ok(guard) => guard,
      Err(poisoned) => poisoned.into_inner(),
    };
    match guard.as_ref() {
      Some(current) if current.built_at >= snapshot.built_at => current.clone(),
      _ => {
        *guard = Some(snapshot.clone());
        snapshot
      }
    }
  }

  fn try_begin_build(&self) -> Option<BuildGuard<'_>> {
    self
      .building
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .ok()
      .map(|_| BuildGuard { flag: &self.building })
  }

  // Building
  // ========

  /// Embed `documents` into a fresh snapshot, persist it, and make it live
  pub async fn build(&self, documents: &[EventDocument]) -> Result<BuildOutcome, ChatError> {
    let Some(_guard) = self.try_begin_build() else {
      crier::verbose!("Index build already in progress, skipping");
      return Ok(BuildOutcome::AlreadyRunning);
    };

    self.build_locked(documents).await
  }

  /// Fetch events from the store and rebuild from them
  pub async fn rebuild_from_store(&self) -> Result<BuildOutcome, ChatError> {
    let Some(_guard) = self.try_begin_build() else {
      crier::verbose!("Index build already in progress, skipping");
      return Ok(BuildOutcome::AlreadyRunning);
    };

    let events = self
      .events
      .find(&EventFilter::default(), self.fetch_limit)
      .await
      .map_err(|e| ChatError::index_build(e.to_string()))?;

    let documents: Vec<EventDocument> = events.iter().map(EventDocument::from).collect();
    self.build_locked(&documents).await
  }

  async fn build_locked(&self, documents: &[EventDocument]) -> Result<BuildOutcome, ChatError> {
    if documents.is_empty() {
      crier::warn!("No events found, keeping the current index");
      return Ok(BuildOutcome::NoEvents);
    }

    crier::info!("Building event index from {} documents", documents.len());

    let mut entries = Vec::with_capacity(documents.len());
    let mut dimension = 0usize;

    for document in documents {
      let content = document.content();
      let embedding = self.embedder.embed(&content).await.map_err(|e| {
        ChatError::index_build(format!("embedding event {}: {e}", document.event_id))
      })?;

      if dimension == 0 {
        dimension = embedding.len();
      } else if embedding.len() != dimension {
        return Err(ChatError::index_build(format!(
          "embedding for event {} has {} dimensions, expected {dimension}",
          document.event_id,
          embedding.len()
        )));
      }

      entries.push(IndexedVector { embedding, metadata: document.metadata(), content });
    }

    let snapshot = Arc::new(VectorIndexSnapshot {
      built_at: Utc::now(),
      embedding_model: self.embedder.model_name().to_string(),
      dimension,
      entries,
    });

    let storage = self.storage.clone();
    let to_save = snapshot.clone();
    tokio::task::spawn_blocking(move || storage.save(&to_save))
      .await
      .map_err(|e| ChatError::index_build(format!("persist task failed: {e}")))?
      .map_err(|e| ChatError::index_build(format!("persisting snapshot: {e}")))?;

    let documents = snapshot.len();
    self.install(snapshot);
    self.builds.fetch_add(1, Ordering::Relaxed);
    crier::success!("Event index built with {documents} documents");

    Ok(BuildOutcome::Built { documents })
  }

  // Loading and refresh
  // ===================

  /// Make the persisted snapshot live. `NotFound` when nothing was persisted,
  /// `IncompatibleIndex` when another embedding model built it.
  pub async fn load(&self) -> Result<Arc<VectorIndexSnapshot>, ChatError> {
    let storage = self.storage.clone();
    let snapshot = tokio::task::spawn_blocking(move || storage.load())
      .await
      .map_err(|e| ChatError::Io(std::io::Error::other(e)))??;

    let current_model = self.embedder.model_name();
    if snapshot.embedding_model != current_model {
      return Err(ChatError::IncompatibleIndex {
        message: format!(
          "persisted index was built with {}, embedder is {current_model}",
          snapshot.embedding_model
        ),
      });
    }

    self.loads.fetch_add(1, Ordering::Relaxed);
    crier::verbose!("Loaded event index with {} documents", snapshot.len());
    Ok(self.install_if_newer(Arc::new(snapshot)))
  }

  /// Load or rebuild so that a snapshot no older than `max_age` is live.
  ///
  /// Failures are logged and reported, but any snapshot that was live before
  /// the call stays live.
  pub async fn ensure_fresh(&self, max_age: Duration) -> Result<(), ChatError> {
    if self.live().is_none() {
      match self.load().await {
        Ok(_) => {}
        Err(ChatError::NotFound { .. }) => {
          crier::info!("No persisted event index, building a new one");
          self.rebuild_from_store().await?;
          return Ok(());
        }
        Err(e) => {
          crier::warn!("Could not load persisted event index ({e}), rebuilding");
          self.rebuild_from_store().await?;
          return Ok(());
        }
      }
    }

    if let Some(snapshot) = self.live() {
      if snapshot.age() > max_age {
        crier::info!("Event index is {}s old, refreshing", snapshot.age().as_secs());
        self.rebuild_from_store().await?;
      }
    }

    Ok(())
  }

  /// Top `k` events for `query`, best first
  pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, ChatError> {
    let snapshot = self.live().ok_or(ChatError::IndexUnavailable)?;
    if snapshot.is_empty() || k == 0 {
      return Ok(Vec::new());
    }

    let embedding = self.embedder.embed(query).await?;
    if embedding.len() != snapshot.dimension {
      return Err(ChatError::IncompatibleIndex {
        message: format!(
          "query has {} dimensions, index has {}",
          embedding.len(),
          snapshot.dimension
        ),
      });
    }
    Ok(snapshot.search(&embedding, k))
  }
}
