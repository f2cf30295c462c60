use serde::{Deserialize, Serialize};

use crate::events::model::Event;

/// Read-only projection of an event, built fresh for every index rebuild
#[derive(Debug, Clone, PartialEq)]
pub struct EventDocument {
  pub event_id: String,
  pub title: Option<String>,
  pub organization_name: String,
  pub event_type: String,
  pub subtype: Option<String>,
  pub date: String,
  pub location: Option<String>,
  pub summary: Option<String>,
}

/// The subset of a document kept next to its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
  pub event_id: String,
  pub title: Option<String>,
  pub date: String,
  pub event_type: String,
  pub subtype: Option<String>,
}

impl From<&Event> for EventDocument {
  fn from(event: &Event) -> Self {
    Self {
      event_id: event.event_id.clone(),
      title: event.title.clone(),
      organization_name: event.organization_label().to_string(),
      event_type: event.event_type.clone(),
      subtype: event.subtype.clone(),
      date: event.date.clone(),
      location: event.location.clone(),
      summary: event.summary.clone(),
    }
  }
}

impl EventDocument {
  /// Text that gets embedded and later shown to the model as grounding
  pub fn content(&self) -> String {
    let organization = or_placeholder(Some(self.organization_name.as_str()), "No organization");

    format!(
      "Title: {}\nOrganization: {}\nType: {}\nSubtype: {}\nDate: {}\nLocation: {}\nSummary: {}",
      or_placeholder(self.title.as_deref(), "No title"),
      organization,
      or_placeholder(Some(self.event_type.as_str()), "No type"),
      or_placeholder(self.subtype.as_deref(), "No subtype"),
      or_placeholder(Some(self.date.as_str()), "No date"),
      or_placeholder(self.location.as_deref(), "No location"),
      or_placeholder(self.summary.as_deref(), "No summary"),
    )
  }

  pub fn metadata(&self) -> EventMetadata {
    EventMetadata {
      event_id: self.event_id.clone(),
      title: self.title.clone(),
      date: self.date.clone(),
      event_type: self.event_type.clone(),
      subtype: self.subtype.clone(),
    }
  }
}

fn or_placeholder<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
  match value {
    Some(v) if !v.trim().is_empty() => v,
    _ => placeholder,
  }
}
