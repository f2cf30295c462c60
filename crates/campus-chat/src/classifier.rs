//! Keyword heuristics that route a message before any model is involved
//!
//! Both classifiers are plain tables of lowercase phrases matched as
//! substrings of the lowercased message, so adjusting coverage never touches
//! control flow.

/// Where a text message should be answered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
  EventRelated,
  General,
}

/// What a matched phrase says about the message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
  /// Names an event-ish topic; enough on its own
  Topic,
  /// A question shape typically asked about events; enough on its own
  Question,
  /// A relative date; only counts together with an interrogative
  RelativeDate,
  Interrogative,
}

pub const EVENT_SIGNALS: &[(&str, Signal)] = &[
  ("event", Signal::Topic),
  ("events", Signal::Topic),
  ("activity", Signal::Topic),
  ("activities", Signal::Topic),
  ("happening", Signal::Topic),
  ("schedule", Signal::Topic),
  ("upcoming", Signal::Topic),
  ("attend", Signal::Topic),
  ("register", Signal::Topic),
  ("join", Signal::Topic),
  ("volunteer", Signal::Topic),
  ("volunteering", Signal::Topic),
  ("society", Signal::Topic),
  ("societies", Signal::Topic),
  ("workshop", Signal::Topic),
  ("seminar", Signal::Topic),
  ("talk", Signal::Topic),
  ("discussion", Signal::Topic),
  ("meeting", Signal::Topic),
  ("concert", Signal::Topic),
  ("exhibition", Signal::Topic),
  ("fair", Signal::Topic),
  ("festival", Signal::Topic),
  ("networking", Signal::Topic),
  ("community", Signal::Topic),
  ("when is", Signal::Question),
  ("where is", Signal::Question),
  ("what time", Signal::Question),
  ("who is organizing", Signal::Question),
  ("how do i get to", Signal::Question),
  ("how can i join", Signal::Question),
  ("how much is", Signal::Question),
  ("is there an event", Signal::Question),
  ("are there any events", Signal::Question),
  ("tomorrow", Signal::RelativeDate),
  ("next week", Signal::RelativeDate),
  ("weekend", Signal::RelativeDate),
  ("this month", Signal::RelativeDate),
  ("what", Signal::Interrogative),
  ("happening", Signal::Interrogative),
];

/// Phrases that ask for the text inside an image rather than a description
pub const EXTRACTION_KEYWORDS: &[&str] = &[
  "read",
  "extract",
  "transcribe",
  "text",
  "ocr",
  "recognize",
  "scan",
  "convert",
  "what does it say",
  "tell me what",
  "document",
  "slide",
  "presentation",
  "content",
  "written",
  "says",
  "explain this slide",
  "explain the slide",
  "explain this document",
  "what is in this slide",
  "what does this slide show",
  "interpret",
];

pub fn classify(message: &str) -> QueryKind {
  let lowered = message.to_lowercase();
  let has = |signal: Signal| {
    EVENT_SIGNALS.iter().any(|(phrase, s)| *s == signal && lowered.contains(phrase))
  };

  if has(Signal::Topic) || has(Signal::Question) {
    return QueryKind::EventRelated;
  }
  if has(Signal::RelativeDate) && has(Signal::Interrogative) {
    return QueryKind::EventRelated;
  }
  QueryKind::General
}

/// Whether an image question should go through OCR
pub fn is_extraction(message: &str) -> bool {
  let lowered = message.to_lowercase();
  EXTRACTION_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}
