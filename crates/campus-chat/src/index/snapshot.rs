use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::events::EventMetadata;
use crate::index::similarity::cosine_similarity;

/// One embedded event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedVector {
  pub embedding: Vec<f32>,
  pub metadata: EventMetadata,
  /// The formatted text that was embedded, reused as grounding
  pub content: String,
}

/// A complete, immutable build of the index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndexSnapshot {
  pub built_at: DateTime<Utc>,
  pub embedding_model: String,
  pub dimension: usize,
  pub entries: Vec<IndexedVector>,
}

/// A search result with its cosine score
#[derive(Debug, Clone)]
pub struct SearchHit {
  pub metadata: EventMetadata,
  pub content: String,
  pub score: f32,
}

impl VectorIndexSnapshot {
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Time since the build finished (zero if the clock went backwards)
  pub fn age(&self) -> Duration {
    (Utc::now() - self.built_at).to_std().unwrap_or(Duration::ZERO)
  }

  /// The `k` entries most similar to `query`, best first
  pub fn search(&self, query: &[f32], k: usize) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = self
      .entries
      .iter()
      .map(|entry| SearchHit {
        metadata: entry.metadata.clone(),
        content: entry.content.clone(),
        score: cosine_similarity(query, &entry.embedding),
      })
      .collect();

    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    hits.truncate(k);
    hits
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entry(id: &str, embedding: Vec<f32>) -> IndexedVector {
    IndexedVector {
      embedding,
      metadata: EventMetadata {
        event_id: id.to_string(),
        title: Some(format!("Event {id}")),
        date: "2025-03-22".to_string(),
        event_type: "University Event".to_string(),
        subtype: None,
      },
      content: format!("Title: Event {id}"),
    }
  }

  fn snapshot() -> VectorIndexSnapshot {
    VectorIndexSnapshot {
      built_at: Utc::now(),
      embedding_model: "test".to_string(),
      dimension: 2,
      entries: vec![
        entry("far", vec![-1.0, 0.0]),
        entry("close", vec![0.9, 0.1]),
        entry("exact", vec![1.0, 0.0]),
        entry("side", vec![0.0, 1.0]),
      ],
    }
  }

  #[test]
  fn test_search_orders_by_descending_score() {
    let hits = snapshot().search(&[1.0, 0.0], 3);

    let ids: Vec<&str> = hits.iter().map(|h| h.metadata.event_id.as_str()).collect();
    assert_eq!(ids, vec!["exact", "close", "side"]);
    assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
  }

  #[test]
  fn test_search_respects_k() {
    let snapshot = snapshot();
    assert_eq!(snapshot.search(&[1.0, 0.0], 10).len(), 4);
    assert_eq!(snapshot.search(&[1.0, 0.0], 1).len(), 1);
    assert!(snapshot.search(&[1.0, 0.0], 0).is_empty());
  }

  #[test]
  fn test_age_of_future_snapshot_is_zero() {
    let snapshot =
      VectorIndexSnapshot { built_at: Utc::now() + chrono::Duration::hours(1), ..snapshot() };
    assert_eq!(snapshot.age(), Duration::ZERO);
  }
}
