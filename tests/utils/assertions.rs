//! Test assertion helpers - fluent API for verifying console state
#![allow(dead_code)] // Test utilities may not all be used in every test

use std::collections::HashSet;

use matchtagger::{MatchConsole, Team};
use uuid::Uuid;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct TimelineAssertion<'a> {
    console: &'a MatchConsole,
}

impl<'a> TimelineAssertion<'a> {
    pub fn for_console(console: &'a MatchConsole) -> Self {
        Self { console }
    }

    /// Asserts ids are unique and returns the event count
    pub async fn has_unique_ids(self) -> usize {
        let events = self.console.snapshot().await.events;
        let ids: HashSet<Uuid> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), events.len(), "timeline contains a duplicate id");
        events.len()
    }

    pub async fn has_len(self, expected: usize) -> Self {
        let len = self.console.snapshot().await.events.len();
        assert_eq!(len, expected, "unexpected timeline length");
        self
    }

    pub async fn contains(self, event_id: Uuid) -> Self {
        let snapshot = self.console.snapshot().await;
        assert!(
            snapshot.events.iter().any(|e| e.id == event_id),
            "event {} should be in the timeline",
            event_id
        );
        self
    }

    pub async fn lacks(self, event_id: Uuid) -> Self {
        let snapshot = self.console.snapshot().await;
        assert!(
            snapshot.events.iter().all(|e| e.id != event_id),
            "event {} should not be in the timeline",
            event_id
        );
        self
    }

    /// Live score from goal events plus the locally held stored score
    pub fn score(self, team: Team, expected: u32) -> Self {
        let live = self.console.stats().team(team).score();
        assert_eq!(live, expected, "live {} score", team);
        self
    }
}
