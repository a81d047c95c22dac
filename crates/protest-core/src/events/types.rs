//! Event Types
//!
//! Compact records of the state transitions a tick produced. The stats
//! layer drains these for cumulative fight/arrest totals; they are also
//! the natural hook for an external event log.

use bevy_ecs::prelude::*;
use serde::Serialize;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A citizen committed a planned state change.
    StateChange,
    /// An enforcer pair engaged a violent citizen.
    Engagement,
    /// A fight resolved into custody.
    Arrest,
    /// A jail term expired and the citizen returned to the grid.
    Release,
}

/// One engine event.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub event_id: String,
    pub tick: u64,
    pub kind: EventKind,
    /// The citizen the event is about.
    pub subject: String,
    /// Enforcers involved, if any.
    pub enforcers: Vec<String>,
    /// Free-form detail, e.g. "quiet -> violent".
    pub detail: String,
}

/// Resource storing events generated this tick.
#[derive(Resource, Debug, Default)]
pub struct TickEvents {
    pub events: Vec<Event>,
    next_event_id: u64,
}

impl TickEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate_id(&mut self) -> String {
        let id = format!("evt_{:08}", self.next_event_id);
        self.next_event_id += 1;
        id
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Record an event with a fresh id.
    pub fn record(
        &mut self,
        tick: u64,
        kind: EventKind,
        subject: impl Into<String>,
        enforcers: Vec<String>,
        detail: impl Into<String>,
    ) {
        let event_id = self.generate_id();
        self.push(Event {
            event_id,
            tick,
            kind,
            subject: subject.into(),
            enforcers,
            detail: detail.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_ids_are_unique() {
        let mut events = TickEvents::new();
        assert!(events.is_empty());

        let id1 = events.generate_id();
        let id2 = events.generate_id();
        assert_ne!(id1, id2);
        assert!(id1.starts_with("evt_"));
    }

    #[test]
    fn test_drain_empties_the_queue() {
        let mut events = TickEvents::new();
        events.record(3, EventKind::Arrest, "cit_0001", vec!["enf_001".into()], "arrested");
        assert_eq!(events.len(), 1);

        let drained = events.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].tick, 3);
        assert!(events.is_empty());
    }
}
