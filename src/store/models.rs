use serde::{Deserialize, Serialize};

use crate::clock::Half;
use crate::timeline::Team;

/// The persisted match row
///
/// Scores here are stored values kept in step with goal events by the
/// console; the live score is always derived from the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub clock_seconds: u32,
    pub clock_running: bool,
    pub half: Half,
    pub half_split_seconds: Option<u32>,
    pub possession_home: u32,
    pub possession_away: u32,
}

impl MatchRecord {
    /// A fresh match at kick-off
    pub fn new(
        id: impl Into<String>,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_score: 0,
            away_score: 0,
            clock_seconds: 0,
            clock_running: false,
            half: Half::First,
            half_split_seconds: None,
            possession_home: 0,
            possession_away: 0,
        }
    }

    pub fn score(&self, team: Team) -> u32 {
        match team {
            Team::Home => self.home_score,
            Team::Away => self.away_score,
        }
    }

    pub fn set_score(&mut self, team: Team, score: u32) {
        match team {
            Team::Home => self.home_score = score,
            Team::Away => self.away_score = score,
        }
    }

    pub fn team_name(&self, team: Team) -> &str {
        match team {
            Team::Home => &self.home_team,
            Team::Away => &self.away_team,
        }
    }
}

/// A set of match-row fields to overwrite. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock_running: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half: Option<Half>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_split_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub possession_home: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub possession_away: Option<u32>,
}

impl MatchPatch {
    pub fn score(team: Team, score: u32) -> Self {
        let mut patch = Self::default();
        match team {
            Team::Home => patch.home_score = Some(score),
            Team::Away => patch.away_score = Some(score),
        }
        patch
    }

    pub fn clock_seconds(seconds: u32) -> Self {
        Self {
            clock_seconds: Some(seconds),
            ..Self::default()
        }
    }

    pub fn clock(seconds: u32, running: bool) -> Self {
        Self {
            clock_seconds: Some(seconds),
            clock_running: Some(running),
            ..Self::default()
        }
    }

    pub fn half(half: Half, half_split_seconds: Option<u32>) -> Self {
        Self {
            half: Some(half),
            half_split_seconds,
            ..Self::default()
        }
    }

    pub fn possession(team: Team, seconds: u32) -> Self {
        let mut patch = Self::default();
        match team {
            Team::Home => patch.possession_home = Some(seconds),
            Team::Away => patch.possession_away = Some(seconds),
        }
        patch
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrites the record fields this patch carries
    pub fn apply_to(&self, record: &mut MatchRecord) {
        if let Some(score) = self.home_score {
            record.home_score = score;
        }
        if let Some(score) = self.away_score {
            record.away_score = score;
        }
        if let Some(seconds) = self.clock_seconds {
            record.clock_seconds = seconds;
        }
        if let Some(running) = self.clock_running {
            record.clock_running = running;
        }
        if let Some(half) = self.half {
            record.half = half;
        }
        if let Some(split) = self.half_split_seconds {
            record.half_split_seconds = Some(split);
        }
        if let Some(seconds) = self.possession_home {
            record.possession_home = seconds;
        }
        if let Some(seconds) = self.possession_away {
            record.possession_away = seconds;
        }
    }
}
