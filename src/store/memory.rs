use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::{MatchPatch, MatchRecord, MatchStore, StoreError};
use crate::event::{EventBus, MatchChange};
use crate::roster::Player;
use crate::timeline::MatchEvent;

/// In-memory implementation of MatchStore for development and testing
///
/// Changes fan out through an in-process EventBus, so several consoles in the
/// same process sharing one store behave like separate clients.
pub struct InMemoryMatchStore {
    matches: RwLock<HashMap<String, MatchRecord>>,
    // match_id -> events in insertion order (oldest first)
    events: RwLock<HashMap<String, Vec<MatchEvent>>>,
    players: RwLock<HashMap<String, Vec<Player>>>,
    bus: EventBus,
}

impl Default for InMemoryMatchStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMatchStore {
    pub fn new() -> Self {
        Self::with_bus(EventBus::new())
    }

    pub fn with_bus(bus: EventBus) -> Self {
        Self {
            matches: RwLock::new(HashMap::new()),
            events: RwLock::new(HashMap::new()),
            players: RwLock::new(HashMap::new()),
            bus,
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Seeds a match row
    pub async fn create_match(&self, record: MatchRecord) -> Result<(), StoreError> {
        let mut matches = self.matches.write().await;
        if matches.contains_key(&record.id) {
            return Err(StoreError::Conflict(format!(
                "Match already exists: {}",
                record.id
            )));
        }
        matches.insert(record.id.clone(), record);
        Ok(())
    }

    /// Seeds a roster entry
    pub async fn add_player(&self, player: Player) {
        let mut players = self.players.write().await;
        players
            .entry(player.match_id.clone())
            .or_default()
            .push(player);
    }

    /// Number of stored events for a match
    pub async fn event_count(&self, match_id: &str) -> usize {
        let events = self.events.read().await;
        events.get(match_id).map(Vec::len).unwrap_or(0)
    }
}

#[async_trait]
impl MatchStore for InMemoryMatchStore {
    #[instrument(skip(self))]
    async fn fetch_match(&self, match_id: &str) -> Result<Option<MatchRecord>, StoreError> {
        let matches = self.matches.read().await;
        Ok(matches.get(match_id).cloned())
    }

    #[instrument(skip(self))]
    async fn fetch_events(&self, match_id: &str) -> Result<Vec<MatchEvent>, StoreError> {
        let events = self.events.read().await;
        Ok(events
            .get(match_id)
            .map(|rows| rows.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn fetch_players(&self, match_id: &str) -> Result<Vec<Player>, StoreError> {
        let players = self.players.read().await;
        Ok(players.get(match_id).cloned().unwrap_or_default())
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn insert_event(&self, event: &MatchEvent, origin: &str) -> Result<(), StoreError> {
        {
            let mut events = self.events.write().await;
            let rows = events.entry(event.match_id.clone()).or_default();
            if rows.iter().any(|e| e.id == event.id) {
                warn!(event_id = %event.id, "Event already exists in memory");
                return Err(StoreError::Conflict(format!(
                    "Event already exists: {}",
                    event.id
                )));
            }
            rows.push(event.clone());
        }

        debug!(match_id = %event.match_id, event_type = %event.event_type, "Event stored in memory");
        self.bus
            .emit(MatchChange::EventInserted {
                origin: origin.to_string(),
                event: event.clone(),
            })
            .await;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_event(
        &self,
        match_id: &str,
        event_id: Uuid,
        origin: &str,
    ) -> Result<(), StoreError> {
        let removed = {
            let mut events = self.events.write().await;
            match events.get_mut(match_id) {
                Some(rows) => {
                    let before = rows.len();
                    rows.retain(|e| e.id != event_id);
                    rows.len() != before
                }
                None => false,
            }
        };

        if !removed {
            debug!(match_id = %match_id, event_id = %event_id, "Delete of absent event");
            return Ok(());
        }

        self.bus
            .emit(MatchChange::EventDeleted {
                origin: origin.to_string(),
                match_id: match_id.to_string(),
                event_id,
            })
            .await;
        Ok(())
    }

    #[instrument(skip(self, patch))]
    async fn update_match(
        &self,
        match_id: &str,
        patch: &MatchPatch,
        origin: &str,
    ) -> Result<(), StoreError> {
        {
            let mut matches = self.matches.write().await;
            let record = matches
                .get_mut(match_id)
                .ok_or_else(|| StoreError::NotFound(format!("Match not found: {}", match_id)))?;
            patch.apply_to(record);
        }

        self.bus
            .emit(MatchChange::MatchUpdated {
                origin: origin.to_string(),
                match_id: match_id.to_string(),
                patch: patch.clone(),
            })
            .await;
        Ok(())
    }

    async fn subscribe(&self, match_id: &str) -> broadcast::Receiver<MatchChange> {
        self.bus.subscribe_to_match(match_id).await
    }

    async fn unsubscribe(&self, match_id: &str) {
        self.bus.prune(match_id).await;
    }
}
