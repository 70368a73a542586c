use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::clock::Half;
use crate::timeline::{EventType, Team};

/// Per-type event tallies shared by team and player lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCounts {
    pub goals: u32,
    pub assists: u32,
    pub shots_on_target: u32,
    pub shots_off_target: u32,
    pub passes_completed: u32,
    pub passes_failed: u32,
    pub fouls_committed: u32,
    pub fouls_won: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub corners: u32,
    pub offsides: u32,
    pub ball_losses: u32,
    pub ball_recoveries: u32,
    pub substitutions_in: u32,
    pub substitutions_out: u32,
}

impl EventCounts {
    pub fn record(&mut self, event_type: EventType) {
        let counter = match event_type {
            EventType::Goal => &mut self.goals,
            EventType::Assist => &mut self.assists,
            EventType::ShotOnTarget => &mut self.shots_on_target,
            EventType::ShotOffTarget => &mut self.shots_off_target,
            EventType::PassSuccess => &mut self.passes_completed,
            EventType::PassFail => &mut self.passes_failed,
            EventType::FoulCommitted => &mut self.fouls_committed,
            EventType::FoulWon => &mut self.fouls_won,
            EventType::YellowCard => &mut self.yellow_cards,
            EventType::RedCard => &mut self.red_cards,
            EventType::Corner => &mut self.corners,
            EventType::Offside => &mut self.offsides,
            EventType::BallLoss => &mut self.ball_losses,
            EventType::BallRecovery => &mut self.ball_recoveries,
            EventType::SubstitutionIn => &mut self.substitutions_in,
            EventType::SubstitutionOut => &mut self.substitutions_out,
        };
        *counter += 1;
    }

    /// Goals count as shots
    pub fn shots(&self) -> u32 {
        self.goals + self.shots_on_target + self.shots_off_target
    }

    /// Rounded percentage of completed passes, None before any pass
    pub fn pass_accuracy(&self) -> Option<u32> {
        let attempts = self.passes_completed + self.passes_failed;
        if attempts == 0 {
            return None;
        }
        Some((f64::from(self.passes_completed) / f64::from(attempts) * 100.0).round() as u32)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStats {
    #[serde(flatten)]
    pub counts: EventCounts,
    /// Game seconds since the team's latest shot, or the whole clock if it never shot
    pub seconds_since_last_shot: u32,
    pub possession_seconds: u32,
    pub possession_pct: u32,
}

impl TeamStats {
    /// Live score, derived from goal events
    pub fn score(&self) -> u32 {
        self.counts.goals
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatLine {
    pub player_id: String,
    pub team: Team,
    #[serde(flatten)]
    pub counts: EventCounts,
}

/// Snapshot of everything derived for a match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    pub clock_seconds: u32,
    pub clock_display: String,
    pub half: Half,
    pub half_display: String,
    pub home: TeamStats,
    pub away: TeamStats,
    /// Keyed by player id
    pub players: BTreeMap<String, PlayerStatLine>,
}

impl MatchStats {
    pub fn team(&self, team: Team) -> &TeamStats {
        match team {
            Team::Home => &self.home,
            Team::Away => &self.away,
        }
    }

    pub fn team_mut(&mut self, team: Team) -> &mut TeamStats {
        match team {
            Team::Home => &mut self.home,
            Team::Away => &mut self.away,
        }
    }
}

/// A stored score that disagrees with the goal events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreMismatch {
    pub team: Team,
    pub stored: u32,
    pub live: u32,
}
