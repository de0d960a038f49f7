//! Lifecycle events emitted after a successful flush
//!
//! One event fires per top-level entity operation, strictly after
//! `write_files` succeeds, carrying the final committed entity. A failed
//! session emits nothing.

use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::builder::types::EntitySchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    ContentTypeCreate,
    ContentTypeUpdate,
    ContentTypeDelete,
    ComponentCreate,
    ComponentUpdate,
    ComponentDelete,
}

impl EventAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ContentTypeCreate => "content-type.create",
            Self::ContentTypeUpdate => "content-type.update",
            Self::ContentTypeDelete => "content-type.delete",
            Self::ComponentCreate => "component.create",
            Self::ComponentUpdate => "component.update",
            Self::ComponentDelete => "component.delete",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchemaEvent {
    pub action: EventAction,
    pub uid: String,
    /// The committed entity; for deletions, its last persisted state.
    pub schema: Option<EntitySchema>,
    pub emitted_at: DateTime<Utc>,
}

/// Telemetry sink the update service notifies. Implementations must tolerate
/// being called from any task.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: SchemaEvent);
}

impl<S: EventSink + ?Sized> EventSink for std::sync::Arc<S> {
    fn emit(&self, event: SchemaEvent) {
        (**self).emit(event);
    }
}

/// Sink that drops every event.
#[derive(Debug, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: SchemaEvent) {}
}

/// Sink that buffers events in memory, for tests and diagnostics.
#[derive(Debug, Default)]
pub struct BufferedSink {
    events: Mutex<Vec<SchemaEvent>>,
}

impl BufferedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SchemaEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl EventSink for BufferedSink {
    fn emit(&self, event: SchemaEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_strings_match_the_wire_names() {
        assert_eq!(EventAction::ContentTypeCreate.as_str(), "content-type.create");
        assert_eq!(EventAction::ComponentDelete.as_str(), "component.delete");
    }

    #[test]
    fn buffered_sink_collects_in_order() {
        let sink = BufferedSink::new();
        sink.emit(SchemaEvent {
            action: EventAction::ComponentCreate,
            uid: "shared.seo".to_string(),
            schema: None,
            emitted_at: Utc::now(),
        });
        sink.emit(SchemaEvent {
            action: EventAction::ComponentUpdate,
            uid: "shared.seo".to_string(),
            schema: None,
            emitted_at: Utc::now(),
        });
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, EventAction::ComponentCreate);
    }
}
