use serde::{Deserialize, Serialize};

use crate::events::store::EventFilter;

/// An organization that hosts events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
  pub organization_id: String,
  pub name: String,
  #[serde(rename = "type", default)]
  pub organization_type: Option<String>,
  #[serde(default)]
  pub subtype: Option<String>,
  #[serde(default)]
  pub location: Option<String>,
  #[serde(default)]
  pub description: Option<String>,
}

/// A listed event, as stored by the hub
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
  pub event_id: String,
  #[serde(default)]
  pub title: Option<String>,
  #[serde(default)]
  pub summary: Option<String>,
  #[serde(default)]
  pub description: Option<String>,
  pub date: String,
  #[serde(default)]
  pub time: Option<String>,
  /// Organization reference: an `organizationId` or, in older data, a plain name
  pub organization: String,
  /// Filled in by the store when the reference resolves
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub organization_name: Option<String>,
  #[serde(rename = "type")]
  pub event_type: String,
  #[serde(default)]
  pub subtype: Option<String>,
  #[serde(default)]
  pub location: Option<String>,
  #[serde(default)]
  pub capacity: u32,
  #[serde(default)]
  pub price: f64,
  #[serde(default)]
  pub registered_users: Vec<String>,
}

impl Event {
  /// Populated organization name, falling back to the raw reference
  pub fn organization_label(&self) -> &str {
    self.organization_name.as_deref().unwrap_or(&self.organization)
  }

  pub fn matches(&self, filter: &EventFilter) -> bool {
    let type_ok = filter.event_type.as_deref().is_none_or(|t| self.event_type == t);
    let subtype_ok = filter.subtype.as_deref().is_none_or(|s| self.subtype.as_deref() == Some(s));
    let org_ok = filter.organization.as_deref().is_none_or(|o| self.organization == o);
    type_ok && subtype_ok && org_ok
  }
}

/// The on-disk catalog: organizations plus the events they host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventCatalog {
  #[serde(default)]
  pub organizations: Vec<Organization>,
  #[serde(default)]
  pub events: Vec<Event>,
}

impl EventCatalog {
  /// Matching events in catalog order, capped at `limit`, organizations populated
  pub fn find(&self, filter: &EventFilter, limit: usize) -> Vec<Event> {
    self
      .events
      .iter()
      .filter(|event| event.matches(filter))
      .take(limit)
      .map(|event| self.populate(event.clone()))
      .collect()
  }

  fn populate(&self, mut event: Event) -> Event {
    if event.organization_name.is_none() {
      event.organization_name = self
        .organizations
        .iter()
        .find(|org| org.organization_id == event.organization)
        .map(|org| org.name.clone());
    }
    event
  }
}
