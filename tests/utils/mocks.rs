#![allow(dead_code)] // Test utilities may not all be used in every test

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use uuid::Uuid;

use matchtagger::{
    notify::{Notice, NoticeLevel, OperatorNotifier},
    roster::Player,
    EventBus, InMemoryMatchStore, MatchChange, MatchEvent, MatchPatch, MatchRecord, MatchStore,
    StoreError,
};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// In-memory store whose writes can be made to fail on demand
#[derive(Clone)]
pub struct FlakyMatchStore {
    inner: Arc<InMemoryMatchStore>,
    fail_inserts: Arc<AtomicBool>,
    fail_deletes: Arc<AtomicBool>,
    fail_score_updates: Arc<AtomicBool>,
    fail_clock_updates: Arc<AtomicBool>,
    update_calls: Arc<AtomicU32>,
}

impl FlakyMatchStore {
    pub fn new() -> Self {
        Self::with_bus(EventBus::new())
    }

    /// A store whose change channels hold only `capacity` undelivered changes
    pub fn with_channel_capacity(capacity: usize) -> Self {
        Self::with_bus(EventBus::with_capacity(capacity))
    }

    fn with_bus(bus: EventBus) -> Self {
        Self {
            inner: Arc::new(InMemoryMatchStore::with_bus(bus)),
            fail_inserts: Arc::new(AtomicBool::new(false)),
            fail_deletes: Arc::new(AtomicBool::new(false)),
            fail_score_updates: Arc::new(AtomicBool::new(false)),
            fail_clock_updates: Arc::new(AtomicBool::new(false)),
            update_calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn inner(&self) -> &InMemoryMatchStore {
        &self.inner
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_score_updates(&self, fail: bool) {
        self.fail_score_updates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_clock_updates(&self, fail: bool) {
        self.fail_clock_updates.store(fail, Ordering::SeqCst);
    }

    pub fn update_calls(&self) -> u32 {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub async fn seed_match(&self, record: MatchRecord) {
        self.inner.create_match(record).await.unwrap();
    }

    pub async fn seed_player(&self, player: Player) {
        self.inner.add_player(player).await;
    }

    pub async fn stored_match(&self, match_id: &str) -> MatchRecord {
        self.inner.fetch_match(match_id).await.unwrap().unwrap()
    }

    pub async fn stored_event_ids(&self, match_id: &str) -> Vec<Uuid> {
        self.inner
            .fetch_events(match_id)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect()
    }

    fn unavailable(what: &str) -> StoreError {
        StoreError::Unavailable(format!("{} rejected by test store", what))
    }
}

#[async_trait]
impl MatchStore for FlakyMatchStore {
    async fn fetch_match(&self, match_id: &str) -> Result<Option<MatchRecord>, StoreError> {
        self.inner.fetch_match(match_id).await
    }

    async fn fetch_events(&self, match_id: &str) -> Result<Vec<MatchEvent>, StoreError> {
        self.inner.fetch_events(match_id).await
    }

    async fn fetch_players(&self, match_id: &str) -> Result<Vec<Player>, StoreError> {
        self.inner.fetch_players(match_id).await
    }

    async fn insert_event(&self, event: &MatchEvent, origin: &str) -> Result<(), StoreError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(Self::unavailable("insert"));
        }
        self.inner.insert_event(event, origin).await
    }

    async fn delete_event(
        &self,
        match_id: &str,
        event_id: Uuid,
        origin: &str,
    ) -> Result<(), StoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Self::unavailable("delete"));
        }
        self.inner.delete_event(match_id, event_id, origin).await
    }

    async fn update_match(
        &self,
        match_id: &str,
        patch: &MatchPatch,
        origin: &str,
    ) -> Result<(), StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);

        let touches_score = patch.home_score.is_some() || patch.away_score.is_some();
        if touches_score && self.fail_score_updates.load(Ordering::SeqCst) {
            return Err(Self::unavailable("score update"));
        }
        let touches_clock = patch.clock_seconds.is_some() || patch.clock_running.is_some();
        if touches_clock && self.fail_clock_updates.load(Ordering::SeqCst) {
            return Err(Self::unavailable("clock update"));
        }
        self.inner.update_match(match_id, patch, origin).await
    }

    async fn subscribe(&self, match_id: &str) -> broadcast::Receiver<MatchChange> {
        self.inner.subscribe(match_id).await
    }

    async fn unsubscribe(&self, match_id: &str) {
        self.inner.unsubscribe(match_id).await
    }
}

/// Keeps every notice shown to the operator
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.notices.lock().unwrap().clear();
    }
}

impl OperatorNotifier for RecordingNotifier {
    fn notify(&self, _match_id: &str, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}
