use uuid::Uuid;

use super::models::MatchEvent;

/// Local, newest-first collection of match events with unique ids
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTimeline {
    events: Vec<MatchEvent>,
}

impl EventTimeline {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Builds a timeline from stored rows that are already newest first.
    /// Later duplicates of an id are dropped.
    pub fn from_events(events: Vec<MatchEvent>) -> Self {
        let mut timeline = Self::new();
        for event in events {
            if !timeline.contains(event.id) {
                timeline.events.push(event);
            }
        }
        timeline
    }

    /// Inserts at the head unless an event with the same id is present.
    /// Returns false for a duplicate, which leaves the timeline untouched.
    pub fn prepend(&mut self, event: MatchEvent) -> bool {
        if self.contains(event.id) {
            return false;
        }
        self.events.insert(0, event);
        true
    }

    /// Removes an event, returning it with the position it occupied
    pub fn remove(&mut self, event_id: Uuid) -> Option<(usize, MatchEvent)> {
        let index = self.events.iter().position(|e| e.id == event_id)?;
        Some((index, self.events.remove(index)))
    }

    /// Puts a previously removed event back where it was.
    ///
    /// If the event came back in the meantime (a store echo is prepended at the
    /// head), that copy is moved to `index` instead. Returns false in that case.
    pub fn restore(&mut self, index: usize, event: MatchEvent) -> bool {
        let present = self.remove(event.id).is_some();
        let index = index.min(self.events.len());
        self.events.insert(index, event);
        !present
    }

    pub fn get(&self, event_id: Uuid) -> Option<&MatchEvent> {
        self.events.iter().find(|e| e.id == event_id)
    }

    pub fn contains(&self, event_id: Uuid) -> bool {
        self.events.iter().any(|e| e.id == event_id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Newest first
    pub fn iter(&self) -> impl Iterator<Item = &MatchEvent> {
        self.events.iter()
    }

    /// Oldest first
    pub fn iter_chronological(&self) -> impl Iterator<Item = &MatchEvent> {
        self.events.iter().rev()
    }

    pub fn events(&self) -> &[MatchEvent] {
        &self.events
    }
}
