use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::changes::MatchChange;

/// Default buffered changes per match before slow receivers lag
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Event bus distributing store changes to every subscriber of a match
#[derive(Debug, Clone)]
pub struct EventBus {
    /// Match-specific channels: match_id -> sender
    match_channels: Arc<RwLock<HashMap<String, broadcast::Sender<MatchChange>>>>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            match_channels: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Emits a change to all subscribers of its match
    pub async fn emit(&self, change: MatchChange) {
        let match_id = change.match_id().to_string();
        let sender = self.match_channels.read().await.get(&match_id).cloned();
        let Some(sender) = sender else {
            debug!(match_id = %match_id, "Match change emitted with no subscribers");
            return;
        };

        match sender.send(change) {
            Ok(receiver_count) => {
                debug!(
                    match_id = %match_id,
                    receivers = receiver_count,
                    "Match change emitted"
                );
            }
            Err(_) => {
                debug!(match_id = %match_id, "Match change emitted with no receivers");
                self.prune(&match_id).await;
            }
        }
    }

    /// Subscribe to changes for a specific match
    pub async fn subscribe_to_match(&self, match_id: &str) -> broadcast::Receiver<MatchChange> {
        self.sender_for(match_id).await.subscribe()
    }

    /// Number of live receivers for a match
    pub async fn receiver_count(&self, match_id: &str) -> usize {
        let match_channels = self.match_channels.read().await;
        match_channels
            .get(match_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Drops a match's channel once nobody listens to it. Returns whether it was removed.
    pub async fn prune(&self, match_id: &str) -> bool {
        let mut match_channels = self.match_channels.write().await;
        let idle = match_channels
            .get(match_id)
            .is_some_and(|sender| sender.receiver_count() == 0);
        if idle {
            match_channels.remove(match_id);
            debug!(match_id = %match_id, "Removed idle match channel");
        }
        idle
    }

    /// Number of matches with an open channel
    pub async fn channel_count(&self) -> usize {
        self.match_channels.read().await.len()
    }

    async fn sender_for(&self, match_id: &str) -> broadcast::Sender<MatchChange> {
        {
            let match_channels = self.match_channels.read().await;
            if let Some(sender) = match_channels.get(match_id) {
                return sender.clone();
            }
        }

        debug!(match_id = %match_id, "Creating new match channel");
        let mut match_channels = self.match_channels.write().await;
        match_channels
            .entry(match_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}
