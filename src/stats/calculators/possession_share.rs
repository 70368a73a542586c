use crate::stats::{MatchStats, StatCalculator, StatsContext};
use crate::timeline::Team;

/// Rounded (home, away) share of two values, 50/50 when both are zero
pub fn share(home: u32, away: u32) -> (u32, u32) {
    let total = u64::from(home) + u64::from(away);
    if total == 0 {
        return (50, 50);
    }
    let pct = |value: u32| (value as f64 / total as f64 * 100.0).round() as u32;
    (pct(home), pct(away))
}

/// Copies possession buckets and their percentages into the team lines
pub struct PossessionCalculator;

impl Default for PossessionCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl PossessionCalculator {
    pub fn new() -> Self {
        Self
    }
}

impl StatCalculator for PossessionCalculator {
    fn calculate(&self, context: &StatsContext, stats: &mut MatchStats) {
        let (home_pct, away_pct) = context.possession.percentages();

        stats.home.possession_seconds = context.possession.bucket(Team::Home);
        stats.home.possession_pct = home_pct;
        stats.away.possession_seconds = context.possession.bucket(Team::Away);
        stats.away.possession_pct = away_pct;
    }

    fn priority(&self) -> u32 {
        crate::stats::calculator_priority::BASE_COUNTS
    }
}
