// Shared persistent store collaborator
//
// Row-based storage for matches, players and match events plus a change
// stream per match. The console only sees the MatchStore trait.

pub use errors::StoreError;
pub use memory::InMemoryMatchStore;
pub use models::{MatchPatch, MatchRecord};
pub use postgres::PostgresMatchStore;

mod errors;
mod memory;
mod models;
mod postgres;

use async_trait::async_trait;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::event::MatchChange;
use crate::roster::Player;
use crate::timeline::MatchEvent;

/// Trait for shared store operations
///
/// Every successful write is fanned out as a `MatchChange` to subscribers of
/// the match, including the writer itself. `origin` tags the change with the
/// writing console's session origin.
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn fetch_match(&self, match_id: &str) -> Result<Option<MatchRecord>, StoreError>;

    /// Events of a match, newest first
    async fn fetch_events(&self, match_id: &str) -> Result<Vec<MatchEvent>, StoreError>;

    async fn fetch_players(&self, match_id: &str) -> Result<Vec<Player>, StoreError>;

    async fn insert_event(&self, event: &MatchEvent, origin: &str) -> Result<(), StoreError>;

    /// Hard delete; deleting an absent row succeeds
    async fn delete_event(
        &self,
        match_id: &str,
        event_id: Uuid,
        origin: &str,
    ) -> Result<(), StoreError>;

    /// Field-level update of the match row: only the fields set in `patch` are written
    async fn update_match(
        &self,
        match_id: &str,
        patch: &MatchPatch,
        origin: &str,
    ) -> Result<(), StoreError>;

    async fn subscribe(&self, match_id: &str) -> broadcast::Receiver<MatchChange>;

    /// Drops the match's fan-out registration once its receivers are gone
    async fn unsubscribe(&self, match_id: &str);
}
