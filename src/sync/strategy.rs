use uuid::Uuid;

use crate::console::LiveMatchState;
use crate::store::MatchPatch;
use crate::timeline::{MatchEvent, Team};

/// How remote changes are folded into local state.
///
/// Each method returns whether local state changed.
pub trait ReconciliationStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Inserts are merged by id; a duplicate is a no-op
    fn apply_insert(&self, state: &mut LiveMatchState, event: MatchEvent) -> bool {
        state.timeline.prepend(event)
    }

    fn apply_delete(&self, state: &mut LiveMatchState, event_id: Uuid) -> bool {
        state.timeline.remove(event_id).is_some()
    }

    fn apply_update(&self, state: &mut LiveMatchState, patch: &MatchPatch) -> bool;
}

/// Remote match-row fields overwrite local ones unconditionally
#[derive(Debug, Default, Clone, Copy)]
pub struct LastWriterWins;

impl ReconciliationStrategy for LastWriterWins {
    fn name(&self) -> &'static str {
        "last_writer_wins"
    }

    fn apply_update(&self, state: &mut LiveMatchState, patch: &MatchPatch) -> bool {
        if patch.is_empty() {
            return false;
        }

        patch.apply_to(&mut state.record);

        if let Some(seconds) = patch.clock_seconds {
            state.clock.set_seconds(seconds);
        }
        if let Some(running) = patch.clock_running {
            state.clock.set_running(running);
        }
        if let Some(half) = patch.half {
            state.clock.set_half(half);
        }
        if let Some(split) = patch.half_split_seconds {
            state.clock.set_half_split(Some(split));
        }
        if let Some(seconds) = patch.possession_home {
            state.possession.set_bucket(Team::Home, seconds);
        }
        if let Some(seconds) = patch.possession_away {
            state.possession.set_bucket(Team::Away, seconds);
        }
        true
    }
}
