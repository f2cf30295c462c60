//! Prompt templates and the fixed replies used when generation fails

use crate::index::SearchHit;

pub const GENERATION_APOLOGY: &str =
  "I'm sorry, I encountered an error generating a response. Please try again later.";

pub const EVENT_FALLBACK_APOLOGY: &str = "I'm sorry, I don't have detailed event information available right now. Please try again later or contact the event organizer directly for more information.";

pub const GENERAL_APOLOGY: &str =
  "I'm sorry, I'm having trouble processing your request. Please try again later.";

pub const IMAGE_APOLOGY: &str =
  "I'm sorry, I couldn't process the image. Please try again with a different image or question.";

pub const EXTRACTION_EMPTY_MESSAGE: &str = "I couldn't extract any text from this image. The image might not contain readable text or the quality might be too low.";

const NO_BOLD: &str = "Do not use ** for bold formatting in your response.";

/// One `EVENT INFORMATION:` block per hit, best match first
pub fn format_context(hits: &[SearchHit]) -> String {
  hits
    .iter()
    .map(|hit| format!("EVENT INFORMATION:\n{}\n", hit.content))
    .collect::<Vec<_>>()
    .join("\n")
}

pub fn grounded_prompt(context: &str, message: &str) -> String {
  format!(
    "You are a helpful assistant for a university campus event app.\n\
     Use the following event information to answer the user's question.\n\
     If the information is not in the provided events, say you don't have that information.\n\
     {NO_BOLD}\n\
     {context}\n\
     User Question: {message}\n\
     Answer:"
  )
}

pub fn event_fallback_prompt(message: &str) -> String {
  format!(
    "You are a helpful assistant for a university campus event app. The user is asking about \
     events, but I don't have specific event information available right now. Please provide a \
     general response to the query: \"{message}\" {NO_BOLD}"
  )
}

pub fn general_prompt(message: &str) -> String {
  format!(
    "You are a helpful assistant for a university campus app. The following is a general \
     knowledge question not related to campus events. Please provide a helpful and accurate \
     response. {NO_BOLD}\nUser: {message}\nAssistant:"
  )
}

pub fn ocr_prompt(message: &str, extracted: &str) -> String {
  format!(
    "You are a helpful assistant for a university campus app.\n\
     The following text was extracted from an image using OCR.\n\
     Please analyze, explain, or answer questions about this text based on the user's query: \"{message}\"\n\
     {NO_BOLD}\n\
     Extracted text:\n\
     {extracted}\n\
     Your response:"
  )
}

pub fn vision_prompt(message: &str) -> String {
  format!("{message} {NO_BOLD}")
}

/// Remove `**` bold markers the model emits despite being asked not to
pub fn strip_bold_markup(text: &str) -> String {
  text.replace("**", "").trim().to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::events::EventMetadata;

  fn hit(title: &str, location: &str, score: f32) -> SearchHit {
    SearchHit {
      metadata: EventMetadata {
        event_id: title.to_lowercase(),
        title: Some(title.to_string()),
        date: "2025-03-22".to_string(),
        event_type: "University Event".to_string(),
        subtype: None,
      },
      content: format!("Title: {title}\nLocation: {location}"),
      score,
    }
  }

  #[test]
  fn test_format_context_blocks() {
    let context = format_context(&[hit("Jazz Night", "Loke Yew Hall", 0.9), hit("Quiz", "Library", 0.4)]);

    assert_eq!(context.matches("EVENT INFORMATION:").count(), 2);
    assert!(context.starts_with("EVENT INFORMATION:\nTitle: Jazz Night"));
    assert!(context.find("Jazz Night").unwrap() < context.find("Quiz").unwrap());
    assert!(format_context(&[]).is_empty());
  }

  #[test]
  fn test_prompts_forbid_bold_markup() {
    for prompt in [
      grounded_prompt("ctx", "q"),
      event_fallback_prompt("q"),
      general_prompt("q"),
      ocr_prompt("q", "text"),
      vision_prompt("q"),
    ] {
      assert!(prompt.contains("Do not use ** for bold"), "missing instruction: {prompt}");
    }
  }

  #[test]
  fn test_grounded_prompt_layout() {
    let prompt = grounded_prompt("EVENT INFORMATION:\nTitle: Jazz Night\n", "When is jazz night?");

    assert!(prompt.contains("say you don't have that information"));
    assert!(prompt.contains("Title: Jazz Night"));
    assert!(prompt.ends_with("User Question: When is jazz night?\nAnswer:"));
  }

  #[test]
  fn test_strip_bold_markup() {
    assert_eq!(strip_bold_markup("**Date:** Friday"), "Date: Friday");
    assert_eq!(strip_bold_markup("plain *emphasis*"), "plain *emphasis*");
  }
}
