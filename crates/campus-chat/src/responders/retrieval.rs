use std::sync::Arc;
use std::time::Duration;

use crate::classifier::QueryKind;
use crate::error::ChatError;
use crate::index::VectorIndex;
use crate::ollama::{GenerationRequest, Generator};
use crate::responders::fallback::FallbackResponder;
use crate::responders::generate_reply;
use crate::responders::prompts::{format_context, grounded_prompt};

/// Answers event questions from the events most similar to the message.
///
/// Refresh failures are tolerated as long as some snapshot is live; any
/// retrieval or generation failure hands the message to the fallback
/// responder with an event hint.
pub struct RetrievalResponder {
  index: Arc<VectorIndex>,
  generator: Arc<dyn Generator>,
  fallback: FallbackResponder,
  chat_model: String,
  k: usize,
  max_age: Duration,
}

impl RetrievalResponder {
  pub fn new(
    index: Arc<VectorIndex>,
    generator: Arc<dyn Generator>,
    fallback: FallbackResponder,
    chat_model: impl Into<String>,
    k: usize,
    max_age: Duration,
  ) -> Self {
    Self { index, generator, fallback, chat_model: chat_model.into(), k, max_age }
  }

  pub async fn respond(&self, message: &str) -> String {
    match self.answer(message).await {
      Ok(reply) => reply,
      Err(e) => {
        crier::warn!("Retrieval failed, falling back: {e}");
        self.fallback.respond(message, QueryKind::EventRelated).await
      }
    }
  }

  /// The `EVENT INFORMATION` blocks a message would be grounded on
  pub async fn grounding_context(&self, message: &str) -> Result<String, ChatError> {
    if let Err(e) = self.index.ensure_fresh(self.max_age).await {
      crier::warn!("Could not refresh event index: {e}");
    }

    let hits = self.index.search(message, self.k).await?;
    crier::verbose!("Retrieved {} events for grounding", hits.len());
    Ok(format_context(&hits))
  }

  async fn answer(&self, message: &str) -> Result<String, ChatError> {
    let context = self.grounding_context(message).await?;
    let request = GenerationRequest::text(&self.chat_model, grounded_prompt(&context, message));
    generate_reply(self.generator.as_ref(), request).await
  }
}
