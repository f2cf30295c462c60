use std::sync::Arc;

use crate::classifier::QueryKind;
use crate::ollama::{GenerationRequest, Generator};
use crate::responders::generate_reply;
use crate::responders::prompts::{
  event_fallback_prompt, general_prompt, EVENT_FALLBACK_APOLOGY, GENERAL_APOLOGY,
};

/// Answers without retrieval; the hint only changes the prompt and apology
#[derive(Clone)]
pub struct FallbackResponder {
  generator: Arc<dyn Generator>,
  chat_model: String,
}

impl FallbackResponder {
  pub fn new(generator: Arc<dyn Generator>, chat_model: impl Into<String>) -> Self {
    Self { generator, chat_model: chat_model.into() }
  }

  pub async fn respond(&self, message: &str, hint: QueryKind) -> String {
    let (prompt, apology) = match hint {
      QueryKind::EventRelated => (event_fallback_prompt(message), EVENT_FALLBACK_APOLOGY),
      QueryKind::General => (general_prompt(message), GENERAL_APOLOGY),
    };

    let request = GenerationRequest::text(&self.chat_model, prompt);
    match generate_reply(self.generator.as_ref(), request).await {
      Ok(reply) => reply,
      Err(e) => {
        crier::warn!("Fallback generation failed ({hint:?}): {e}");
        apology.to_string()
      }
    }
  }
}
