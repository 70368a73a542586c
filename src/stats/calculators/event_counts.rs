use crate::stats::{MatchStats, ScoreMismatch, StatCalculator, StatsContext};
use crate::store::MatchRecord;
use crate::timeline::{EventTimeline, EventType, Team};

/// Tallies every event into its team's counts
pub struct EventCountCalculator;

impl Default for EventCountCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl EventCountCalculator {
    pub fn new() -> Self {
        Self
    }
}

impl StatCalculator for EventCountCalculator {
    fn calculate(&self, context: &StatsContext, stats: &mut MatchStats) {
        for event in context.timeline.iter() {
            stats.team_mut(event.team).counts.record(event.event_type);
        }
    }

    fn priority(&self) -> u32 {
        crate::stats::calculator_priority::BASE_COUNTS
    }
}

/// Score derived from goal events
pub fn live_score(timeline: &EventTimeline, team: Team) -> u32 {
    timeline
        .iter()
        .filter(|e| e.team == team && e.event_type == EventType::Goal)
        .count() as u32
}

/// Teams whose stored score differs from the live score
pub fn score_mismatches(record: &MatchRecord, timeline: &EventTimeline) -> Vec<ScoreMismatch> {
    [Team::Home, Team::Away]
        .into_iter()
        .filter_map(|team| {
            let stored = record.score(team);
            let live = live_score(timeline, team);
            (stored != live).then_some(ScoreMismatch { team, stored, live })
        })
        .collect()
}
