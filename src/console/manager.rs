use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use super::errors::ConsoleError;
use super::service::{ConsoleSettings, MatchConsole};
use crate::notify::{OperatorNotifier, TracingNotifier};
use crate::session::{ConsoleSession, Role};
use crate::store::MatchStore;
use crate::video::SharedPlayhead;

/// A loaded console plus the playhead its video front end reports into
#[derive(Clone)]
pub struct ManagedConsole {
    pub console: Arc<MatchConsole>,
    pub playhead: Arc<SharedPlayhead>,
}

/// Keeps one console per match for the lifetime of the process
pub struct ConsoleManager {
    store: Arc<dyn MatchStore>,
    role: Role,
    settings: ConsoleSettings,
    notifier: Arc<dyn OperatorNotifier>,
    consoles: RwLock<HashMap<String, ManagedConsole>>,
}

impl ConsoleManager {
    pub fn new(store: Arc<dyn MatchStore>, role: Role, settings: ConsoleSettings) -> Self {
        Self {
            store,
            role,
            settings,
            notifier: Arc::new(TracingNotifier),
            consoles: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn OperatorNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the console for a match, loading it on first use
    pub async fn get_or_load(&self, match_id: &str) -> Result<ManagedConsole, ConsoleError> {
        if let Some(managed) = self.consoles.read().await.get(match_id) {
            return Ok(managed.clone());
        }

        let mut consoles = self.consoles.write().await;
        // Another request may have loaded it while we waited
        if let Some(managed) = consoles.get(match_id) {
            return Ok(managed.clone());
        }

        let playhead = Arc::new(SharedPlayhead::new());
        let console = MatchConsole::builder(match_id, self.store.clone())
            .with_session(ConsoleSession::new(self.role))
            .with_settings(self.settings.clone())
            .with_video(playhead.clone())
            .with_notifier(self.notifier.clone())
            .load()
            .await?;

        let managed = ManagedConsole { console, playhead };
        consoles.insert(match_id.to_string(), managed.clone());
        debug!(match_id = %match_id, loaded = consoles.len(), "Console cached");
        Ok(managed)
    }

    pub async fn get(&self, match_id: &str) -> Option<ManagedConsole> {
        self.consoles.read().await.get(match_id).cloned()
    }

    /// Tears down and forgets a match's console. Returns false if none was loaded.
    pub async fn release(&self, match_id: &str) -> bool {
        let removed = self.consoles.write().await.remove(match_id);
        match removed {
            Some(managed) => {
                managed.console.teardown().await;
                info!(match_id = %match_id, "Console released");
                true
            }
            None => false,
        }
    }

    pub async fn release_all(&self) {
        let drained: Vec<_> = self.consoles.write().await.drain().collect();
        for (_, managed) in drained {
            managed.console.teardown().await;
        }
    }

    pub async fn loaded_count(&self) -> usize {
        self.consoles.read().await.len()
    }
}
