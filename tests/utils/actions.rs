#![allow(dead_code)] // Test utilities may not all be used in every test

use tokio::time::{sleep, Duration};

use matchtagger::{Confirmation, ConsoleError, EventType, MatchEvent, Team};

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Let subscription tasks deliver pending changes
    pub async fn settle(&self) {
        sleep(Duration::from_millis(20)).await;
    }

    pub async fn record(&self, event_type: EventType, team: Team) -> MatchEvent {
        self.console.add_event(event_type, team, None).await.unwrap()
    }

    pub async fn record_for(&self, event_type: EventType, team: Team, player_id: &str) -> MatchEvent {
        self.console
            .add_event(event_type, team, Some(player_id.to_string()))
            .await
            .unwrap()
    }

    pub async fn delete(&self, event: &MatchEvent) -> Result<Option<MatchEvent>, ConsoleError> {
        self.console
            .delete_event(event.id, Confirmation::Confirmed)
            .await
    }
}
