use crate::stats::{MatchStats, StatCalculator, StatsContext};
use crate::timeline::{EventTimeline, Team};

/// Game seconds since a team's latest shot at or before `clock_seconds`.
///
/// Shots recorded after the current clock value (say, before a clock reset)
/// are ignored. A team that has not shot yet reports the full clock value.
pub fn time_since_last_shot(timeline: &EventTimeline, team: Team, clock_seconds: u32) -> u32 {
    let last_shot = timeline
        .iter()
        .filter(|e| e.team == team && e.event_type.is_shot())
        .filter_map(|e| e.effective_seconds())
        .filter(|&seconds| seconds <= clock_seconds)
        .max();

    match last_shot {
        Some(seconds) => clock_seconds.saturating_sub(seconds),
        None => clock_seconds,
    }
}

pub struct ShotTimingCalculator;

impl Default for ShotTimingCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShotTimingCalculator {
    pub fn new() -> Self {
        Self
    }
}

impl StatCalculator for ShotTimingCalculator {
    fn calculate(&self, context: &StatsContext, stats: &mut MatchStats) {
        let clock_seconds = context.clock.seconds();
        for team in [Team::Home, Team::Away] {
            stats.team_mut(team).seconds_since_last_shot =
                time_since_last_shot(context.timeline, team, clock_seconds);
        }
    }

    fn priority(&self) -> u32 {
        crate::stats::calculator_priority::DERIVED
    }
}
