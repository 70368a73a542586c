use serde::{Deserialize, Serialize};

use crate::timeline::Team;

/// Default number of bucket increments between possession flushes
pub const DEFAULT_POSSESSION_FLUSH_EVERY: u32 = 5;

/// Result of a one-second possession tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PossessionTick {
    /// No side is active
    Idle,
    Advanced { team: Team, seconds: u32 },
    /// The bucket reached a flush boundary and should be written to the store
    Flush { team: Team, seconds: u32 },
}

impl PossessionTick {
    pub fn is_idle(&self) -> bool {
        matches!(self, PossessionTick::Idle)
    }
}

/// Accumulated possession seconds per side
///
/// At most one side is active. Buckets only ever grow locally; switching the
/// active side changes which bucket the next tick advances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PossessionState {
    home: u32,
    away: u32,
    active: Option<Team>,
}

impl PossessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes accumulation from persisted buckets with no active side
    pub fn restore(home: u32, away: u32) -> Self {
        Self {
            home,
            away,
            active: None,
        }
    }

    pub fn home(&self) -> u32 {
        self.home
    }

    pub fn away(&self) -> u32 {
        self.away
    }

    pub fn active(&self) -> Option<Team> {
        self.active
    }

    pub fn bucket(&self, team: Team) -> u32 {
        match team {
            Team::Home => self.home,
            Team::Away => self.away,
        }
    }

    /// Returns true when the active side changed
    pub fn set_active(&mut self, side: Option<Team>) -> bool {
        let changed = self.active != side;
        self.active = side;
        changed
    }

    pub fn tick(&mut self, flush_every: u32) -> PossessionTick {
        let Some(team) = self.active else {
            return PossessionTick::Idle;
        };

        let bucket = match team {
            Team::Home => &mut self.home,
            Team::Away => &mut self.away,
        };
        *bucket = bucket.saturating_add(1);
        let seconds = *bucket;

        if flush_every > 0 && seconds % flush_every == 0 {
            PossessionTick::Flush { team, seconds }
        } else {
            PossessionTick::Advanced { team, seconds }
        }
    }

    /// Remote overwrite of one bucket
    pub fn set_bucket(&mut self, team: Team, seconds: u32) {
        match team {
            Team::Home => self.home = seconds,
            Team::Away => self.away = seconds,
        }
    }

    pub fn total(&self) -> u32 {
        self.home.saturating_add(self.away)
    }

    /// Rounded (home, away) percentages.
    ///
    /// A zero total is divided as if it were 1, so an untouched match reports
    /// 0% for both sides rather than 50/50.
    pub fn percentages(&self) -> (u32, u32) {
        let total = f64::from(self.total().max(1));
        let pct = |bucket: u32| (f64::from(bucket) / total * 100.0).round() as u32;
        (pct(self.home), pct(self.away))
    }
}
