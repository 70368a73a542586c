#![allow(dead_code)] // Test utilities may not all be used in every test

use std::sync::Arc;
use std::time::Duration;

use matchtagger::{
    roster::Player,
    video::SharedPlayhead,
    ConsoleSession, ConsoleSettings, MatchConsole, MatchRecord, Role, Team,
};

use super::mocks::{FlakyMatchStore, RecordingNotifier};

pub const TEST_MATCH_ID: &str = "match-1";

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub store: FlakyMatchStore,
    pub console: Arc<MatchConsole>,
    pub notifier: Arc<RecordingNotifier>,
    pub playhead: Arc<SharedPlayhead>,
    settings: ConsoleSettings,
}

impl TestSetup {
    /// Opens another console on the same store, as a second client would
    pub async fn second_console(&self, role: Role) -> Arc<MatchConsole> {
        MatchConsole::builder(TEST_MATCH_ID, Arc::new(self.store.clone()))
            .with_session(ConsoleSession::new(role))
            .with_settings(self.settings.clone())
            .load()
            .await
            .unwrap()
    }
}

pub struct TestSetupBuilder {
    record: MatchRecord,
    players: Vec<Player>,
    role: Role,
    settings: ConsoleSettings,
    channel_capacity: Option<usize>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            record: MatchRecord::new(TEST_MATCH_ID, "Rovers", "United"),
            players: vec![],
            role: Role::Operator,
            settings: ConsoleSettings {
                tick: Duration::from_secs(1),
                clock_flush_every: 10,
                possession_flush_every: 5,
            },
            channel_capacity: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Shrinks the store's change channels so slow consoles lag
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = Some(capacity);
        self
    }

    pub fn with_record(mut self, record: MatchRecord) -> Self {
        self.record = record;
        self
    }

    pub fn with_player(mut self, id: &str, team: Team, jersey_number: i16, starter: bool) -> Self {
        self.players.push(Player {
            id: id.to_string(),
            match_id: TEST_MATCH_ID.to_string(),
            team,
            jersey_number,
            name: id.to_string(),
            starter,
        });
        self
    }

    /// A small home squad: two starters and one substitute
    pub fn with_home_squad(self) -> Self {
        self.with_player("keeper", Team::Home, 1, true)
            .with_player("striker", Team::Home, 9, true)
            .with_player("winger", Team::Home, 17, false)
    }

    pub async fn build(self) -> TestSetup {
        let store = match self.channel_capacity {
            Some(capacity) => FlakyMatchStore::with_channel_capacity(capacity),
            None => FlakyMatchStore::new(),
        };
        store.seed_match(self.record).await;
        for player in self.players {
            store.seed_player(player).await;
        }

        let notifier = Arc::new(RecordingNotifier::new());
        let playhead = Arc::new(SharedPlayhead::new());
        let console = MatchConsole::builder(TEST_MATCH_ID, Arc::new(store.clone()))
            .with_session(ConsoleSession::new(self.role))
            .with_settings(self.settings.clone())
            .with_notifier(notifier.clone())
            .with_video(playhead.clone())
            .load()
            .await
            .unwrap();

        TestSetup {
            store,
            console,
            notifier,
            playhead,
            settings: self.settings,
        }
    }
}
