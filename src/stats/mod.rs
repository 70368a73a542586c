// Derived statistics
//
// Pure folds of the event timeline, clock and possession into team and
// player statistics. Nothing here is persisted; stats are recomputed after
// every state change.

pub mod calculators;

mod engine;
pub mod models;
mod publisher;

pub use calculators::{live_score, score_mismatches, share, time_since_last_shot};
pub use engine::{StatsEngine, StatsEngineBuilder};
pub use models::*;
pub use publisher::StatsPublisher;

use crate::clock::GameClock;
use crate::possession::PossessionState;
use crate::timeline::EventTimeline;

/// Priority constants for stat calculators.
/// Lower values run first; later calculators may read earlier results.
pub mod calculator_priority {
    /// Raw counts folded straight from events
    pub const BASE_COUNTS: u32 = 100;
    /// Values derived from the clock or from other stats
    pub const DERIVED: u32 = 200;
}

/// Everything a calculator may read
#[derive(Clone, Copy)]
pub struct StatsContext<'a> {
    pub timeline: &'a EventTimeline,
    pub clock: &'a GameClock,
    pub possession: &'a PossessionState,
}

impl<'a> StatsContext<'a> {
    pub fn new(
        timeline: &'a EventTimeline,
        clock: &'a GameClock,
        possession: &'a PossessionState,
    ) -> Self {
        Self {
            timeline,
            clock,
            possession,
        }
    }
}

pub trait StatCalculator: Send + Sync {
    fn calculate(&self, context: &StatsContext, stats: &mut MatchStats);

    fn priority(&self) -> u32;
}
