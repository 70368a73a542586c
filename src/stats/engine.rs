use std::sync::Arc;

use tracing::trace;

use super::{
    calculators::{
        EventCountCalculator, PlayerLineCalculator, PossessionCalculator, ShotTimingCalculator,
    },
    MatchStats, StatCalculator, StatsContext,
};

/// Runs the registered calculators over a match snapshot
pub struct StatsEngine {
    calculators: Vec<Arc<dyn StatCalculator>>,
}

impl Default for StatsEngine {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl StatsEngine {
    pub fn builder() -> StatsEngineBuilder {
        StatsEngineBuilder::new()
    }

    pub fn calculator_count(&self) -> usize {
        self.calculators.len()
    }

    pub fn compute(&self, context: &StatsContext) -> MatchStats {
        let mut stats = MatchStats {
            clock_seconds: context.clock.seconds(),
            clock_display: context.clock.display(),
            half: context.clock.half(),
            half_display: context.clock.half_display(),
            ..MatchStats::default()
        };

        for calculator in &self.calculators {
            calculator.calculate(context, &mut stats);
        }

        trace!(
            events = context.timeline.len(),
            home_score = stats.home.score(),
            away_score = stats.away.score(),
            "Computed match stats"
        );
        stats
    }
}

pub struct StatsEngineBuilder {
    calculators: Vec<Arc<dyn StatCalculator>>,
}

impl StatsEngineBuilder {
    fn new() -> Self {
        Self {
            calculators: vec![
                Arc::new(EventCountCalculator::new()),
                Arc::new(PossessionCalculator::new()),
                Arc::new(PlayerLineCalculator::new()),
                Arc::new(ShotTimingCalculator::new()),
            ],
        }
    }

    /// Starts from no calculators at all
    pub fn empty() -> Self {
        Self {
            calculators: Vec::new(),
        }
    }

    pub fn with_calculator(mut self, calculator: Arc<dyn StatCalculator>) -> Self {
        self.calculators.push(calculator);
        self
    }

    pub fn build(mut self) -> StatsEngine {
        self.calculators.sort_by_key(|c| c.priority());
        StatsEngine {
            calculators: self.calculators,
        }
    }
}
