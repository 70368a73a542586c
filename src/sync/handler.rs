use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use super::strategy::ReconciliationStrategy;
use crate::console::LiveMatchState;
use crate::event::{ChangeHandlerError, MatchChange, MatchChangeHandler};
use crate::stats::{score_mismatches, StatsPublisher};
use crate::store::{MatchStore, StoreError};

/// Told when another client starts the shared clock
#[async_trait]
pub trait RemoteClockListener: Send + Sync {
    async fn remote_clock_started(&self);
}

/// Applies a match's change stream to one console's local state
pub struct MatchSyncHandler {
    state: Arc<RwLock<LiveMatchState>>,
    strategy: Arc<dyn ReconciliationStrategy>,
    origin: String,
    stats: StatsPublisher,
    store: Arc<dyn MatchStore>,
    clock_listener: Option<Weak<dyn RemoteClockListener>>,
}

impl MatchSyncHandler {
    pub fn new(
        state: Arc<RwLock<LiveMatchState>>,
        strategy: Arc<dyn ReconciliationStrategy>,
        origin: impl Into<String>,
        stats: StatsPublisher,
        store: Arc<dyn MatchStore>,
    ) -> Self {
        Self {
            state,
            strategy,
            origin: origin.into(),
            stats,
            store,
            clock_listener: None,
        }
    }

    pub fn with_clock_listener(mut self, listener: Weak<dyn RemoteClockListener>) -> Self {
        self.clock_listener = Some(listener);
        self
    }

    /// Rebuilds local state from a fresh read of the store
    pub async fn resync_from_store(&self, match_id: &str) -> Result<(), StoreError> {
        let record = self
            .store
            .fetch_match(match_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Match not found: {}", match_id)))?;
        let events = self.store.fetch_events(match_id).await?;
        let players = self.store.fetch_players(match_id).await?;

        let (started, event_count) = {
            let mut state = self.state.write().await;
            let was_running = state.clock.running();
            state.rebase(record, events, players);
            self.stats.publish(&state.stats_context());
            (!was_running && state.clock.running(), state.timeline.len())
        };

        info!(match_id = %match_id, events = event_count, "Resynced from store");
        if started {
            self.clock_started().await;
        }
        Ok(())
    }

    async fn clock_started(&self) {
        if let Some(listener) = self.clock_listener.as_ref().and_then(Weak::upgrade) {
            listener.remote_clock_started().await;
        }
    }
}

#[async_trait]
impl MatchChangeHandler for MatchSyncHandler {
    async fn handle_change(
        &self,
        match_id: &str,
        change: MatchChange,
    ) -> Result<(), ChangeHandlerError> {
        if change.match_id() != match_id {
            return Err(ChangeHandlerError::WrongMatch(change.match_id().to_string()));
        }

        // Our own row updates are already applied locally
        if matches!(change, MatchChange::MatchUpdated { .. }) && change.origin() == self.origin {
            return Ok(());
        }

        let change_type = change.change_type();
        let mut state = self.state.write().await;
        let was_running = state.clock.running();

        let changed = match change {
            MatchChange::EventInserted { event, .. } => self.strategy.apply_insert(&mut state, event),
            MatchChange::EventDeleted { event_id, .. } => {
                self.strategy.apply_delete(&mut state, event_id)
            }
            MatchChange::MatchUpdated { patch, .. } => {
                let changed = self.strategy.apply_update(&mut state, &patch);
                if patch.home_score.is_some() || patch.away_score.is_some() {
                    for mismatch in score_mismatches(&state.record, &state.timeline) {
                        error!(
                            match_id = %match_id,
                            team = %mismatch.team,
                            stored = mismatch.stored,
                            live = mismatch.live,
                            "Stored score disagrees with goal events"
                        );
                    }
                }
                changed
            }
        };

        debug!(
            match_id = %match_id,
            change = change_type,
            strategy = self.strategy.name(),
            changed = changed,
            "Merged remote change"
        );

        if changed {
            self.stats.publish(&state.stats_context());
        }
        let started = !was_running && state.clock.running();
        drop(state);

        if started {
            self.clock_started().await;
        }
        Ok(())
    }

    async fn resync(&self, match_id: &str) -> Result<(), ChangeHandlerError> {
        self.resync_from_store(match_id)
            .await
            .map_err(|e| ChangeHandlerError::HandlerError(e.to_string()))
    }

    fn handler_name(&self) -> &'static str {
        "MatchSyncHandler"
    }
}
