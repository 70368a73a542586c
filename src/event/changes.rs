use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::MatchPatch;
use crate::timeline::MatchEvent;

/// A row-level change in the shared store, as fanned out to every client
///
/// `origin` is the session origin of the console that made the write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchChange {
    EventInserted {
        origin: String,
        event: MatchEvent,
    },
    EventDeleted {
        origin: String,
        match_id: String,
        event_id: Uuid,
    },
    MatchUpdated {
        origin: String,
        match_id: String,
        patch: MatchPatch,
    },
}

impl MatchChange {
    pub fn match_id(&self) -> &str {
        match self {
            MatchChange::EventInserted { event, .. } => &event.match_id,
            MatchChange::EventDeleted { match_id, .. } => match_id,
            MatchChange::MatchUpdated { match_id, .. } => match_id,
        }
    }

    pub fn origin(&self) -> &str {
        match self {
            MatchChange::EventInserted { origin, .. } => origin,
            MatchChange::EventDeleted { origin, .. } => origin,
            MatchChange::MatchUpdated { origin, .. } => origin,
        }
    }

    /// Short name for logging
    pub fn change_type(&self) -> &'static str {
        match self {
            MatchChange::EventInserted { .. } => "event_inserted",
            MatchChange::EventDeleted { .. } => "event_deleted",
            MatchChange::MatchUpdated { .. } => "match_updated",
        }
    }
}
