use std::path::PathBuf;
use thiserror::Error;

/// Every failure the chat subsystem can observe.
///
/// Responders recover from all of these locally and turn them into a reply;
/// only an explicit index refresh reports them to its caller.
#[derive(Debug, Error)]
pub enum ChatError {
  #[error("Failed to build event index: {message}")]
  IndexBuild { message: String },

  #[error("No event index has been built or loaded")]
  IndexUnavailable,

  #[error("No persisted event index at {}", path.display())]
  NotFound { path: PathBuf },

  #[error("Event index does not match the current embedder: {message}")]
  IncompatibleIndex { message: String },

  #[error("No text could be extracted from the image")]
  ExtractionEmpty,

  #[error("Request to {endpoint} timed out after {seconds}s")]
  EndpointTimeout { endpoint: String, seconds: u64 },

  #[error("Could not reach {endpoint}: {message}")]
  EndpointUnreachable { endpoint: String, message: String },

  #[error("Unexpected response from {endpoint}: {message}")]
  MalformedResponse { endpoint: String, message: String },

  #[error("Text recognition failed: {message}")]
  Recognition { message: String },

  #[error("Event store query failed: {message}")]
  EventStore { message: String },

  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error("Serialization failed: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl ChatError {
  pub fn index_build(message: impl Into<String>) -> Self {
    ChatError::IndexBuild { message: message.into() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_messages() {
    let err = ChatError::EndpointTimeout { endpoint: "/api/generate".to_string(), seconds: 30 };
    assert_eq!(err.to_string(), "Request to /api/generate timed out after 30s");

    let err = ChatError::NotFound { path: PathBuf::from("/tmp/index.json") };
    assert_eq!(err.to_string(), "No persisted event index at /tmp/index.json");

    assert_eq!(
      ChatError::index_build("embedding endpoint down").to_string(),
      "Failed to build event index: embedding endpoint down"
    );

    let err = ChatError::IncompatibleIndex {
      message: "query has 3 dimensions, index has 14".to_string(),
    };
    assert_eq!(
      err.to_string(),
      "Event index does not match the current embedder: query has 3 dimensions, index has 14"
    );
  }
}
