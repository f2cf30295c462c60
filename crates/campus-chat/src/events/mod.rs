//! Event store collaborator
//!
//! The chat subsystem only reads events. `JsonEventStore` serves them from a
//! catalog file shaped like the hub's seed data, with organization names
//! populated onto each event.

pub mod document;
pub mod model;
pub mod store;

pub use document::{EventDocument, EventMetadata};
pub use model::{Event, EventCatalog, Organization};
pub use store::{EventFilter, EventStore, JsonEventStore};
