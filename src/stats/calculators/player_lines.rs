use crate::stats::{MatchStats, PlayerStatLine, StatCalculator, StatsContext};
use crate::stats::EventCounts;

/// Builds a stat line for every player referenced by an event
pub struct PlayerLineCalculator;

impl Default for PlayerLineCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerLineCalculator {
    pub fn new() -> Self {
        Self
    }
}

impl StatCalculator for PlayerLineCalculator {
    fn calculate(&self, context: &StatsContext, stats: &mut MatchStats) {
        for event in context.timeline.iter() {
            let Some(player_id) = &event.player_id else {
                continue;
            };

            stats
                .players
                .entry(player_id.clone())
                .or_insert_with(|| PlayerStatLine {
                    player_id: player_id.clone(),
                    team: event.team,
                    counts: EventCounts::default(),
                })
                .counts
                .record(event.event_type);
        }
    }

    fn priority(&self) -> u32 {
        crate::stats::calculator_priority::BASE_COUNTS
    }
}
