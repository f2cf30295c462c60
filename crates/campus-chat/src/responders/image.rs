use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use std::sync::Arc;

use crate::classifier::is_extraction;
use crate::error::ChatError;
use crate::ocr::TextRecognizer;
use crate::ollama::{GenerationRequest, Generator};
use crate::responders::generate_reply;
use crate::responders::prompts::{
  ocr_prompt, vision_prompt, EXTRACTION_EMPTY_MESSAGE, GENERATION_APOLOGY, IMAGE_APOLOGY,
};

/// Answers questions about an attached image.
///
/// Reading requests go through OCR and a text model; everything else sends
/// the raw image to the multimodal model.
pub struct ImageResponder {
  generator: Arc<dyn Generator>,
  recognizer: Arc<dyn TextRecognizer>,
  chat_model: String,
  vision_model: String,
}

impl ImageResponder {
  pub fn new(
    generator: Arc<dyn Generator>,
    recognizer: Arc<dyn TextRecognizer>,
    chat_model: impl Into<String>,
    vision_model: impl Into<String>,
  ) -> Self {
    Self {
      generator,
      recognizer,
      chat_model: chat_model.into(),
      vision_model: vision_model.into(),
    }
  }

  pub async fn respond(&self, message: &str, image_path: &Path) -> String {
    if is_extraction(message) {
      self.respond_with_ocr(message, image_path).await
    } else {
      self.respond_with_vision(message, image_path).await
    }
  }

  /// Recognized text, or `ExtractionEmpty` when only whitespace came back
  pub async fn extract_text(&self, image_path: &Path) -> Result<String, ChatError> {
    let text = self.recognizer.recognize(image_path).await?;
    if text.trim().is_empty() {
      return Err(ChatError::ExtractionEmpty);
    }
    Ok(text)
  }

  async fn respond_with_ocr(&self, message: &str, image_path: &Path) -> String {
    crier::verbose!("Reading text from {}", image_path.display());

    let text = match self.extract_text(image_path).await {
      Ok(text) => text,
      Err(ChatError::ExtractionEmpty) => return EXTRACTION_EMPTY_MESSAGE.to_string(),
      Err(e) => {
        crier::warn!("Text recognition failed: {e}");
        return IMAGE_APOLOGY.to_string();
      }
    };

    let request = GenerationRequest::text(&self.chat_model, ocr_prompt(message, text.trim()));
    generate_reply(self.generator.as_ref(), request).await.unwrap_or_else(|e| {
      crier::warn!("Generation over extracted text failed: {e}");
      GENERATION_APOLOGY.to_string()
    })
  }

  async fn respond_with_vision(&self, message: &str, image_path: &Path) -> String {
    let bytes = match tokio::fs::read(image_path).await {
      Ok(bytes) => bytes,
      Err(e) => {
        crier::warn!("Could not read image {}: {e}", image_path.display());
        return IMAGE_APOLOGY.to_string();
      }
    };

    let request = GenerationRequest::with_images(
      &self.vision_model,
      vision_prompt(message),
      vec![STANDARD.encode(bytes)],
    );
    generate_reply(self.generator.as_ref(), request).await.unwrap_or_else(|e| {
      crier::warn!("Multimodal generation failed: {e}");
      GENERATION_APOLOGY.to_string()
    })
  }
}
