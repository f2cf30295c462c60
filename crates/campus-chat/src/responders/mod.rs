//! The three ways a message gets answered
//!
//! Responders own their failure handling: each one turns every error into
//! user-facing text, so callers always get a reply back.

pub mod fallback;
pub mod image;
pub mod prompts;
pub mod retrieval;

pub use fallback::FallbackResponder;
pub use image::ImageResponder;
pub use retrieval::RetrievalResponder;

use crate::error::ChatError;
use crate::ollama::{GenerationRequest, Generator};

/// Generate and clean up a reply, treating an empty answer as a failure
pub(crate) async fn generate_reply(
  generator: &dyn Generator,
  request: GenerationRequest,
) -> Result<String, ChatError> {
  let model = request.model.clone();
  let raw = generator.generate(request).await?;
  let reply = prompts::strip_bold_markup(&raw);

  if reply.is_empty() {
    return Err(ChatError::MalformedResponse {
      endpoint: model,
      message: "model returned an empty response".to_string(),
    });
  }
  Ok(reply)
}
