use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::clock::{match_minute_for, GameClock, Half};

/// Side of the pitch an event is credited to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Team {
    Home,
    Away,
}

impl TryFrom<String> for Team {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::Home => Team::Away,
            Team::Away => Team::Home,
        }
    }
}

/// Closed set of taggable event kinds
///
/// The snake_case string form is the wire and column representation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
    Goal,
    Assist,
    PassSuccess,
    PassFail,
    ShotOnTarget,
    ShotOffTarget,
    FoulCommitted,
    FoulWon,
    YellowCard,
    RedCard,
    Corner,
    Offside,
    BallLoss,
    BallRecovery,
    SubstitutionIn,
    SubstitutionOut,
}

impl EventType {
    /// Goals count as shots for shot timing
    pub fn is_shot(self) -> bool {
        matches!(
            self,
            EventType::ShotOnTarget | EventType::ShotOffTarget | EventType::Goal
        )
    }

    pub fn is_substitution(self) -> bool {
        matches!(self, EventType::SubstitutionIn | EventType::SubstitutionOut)
    }
}

/// A single tagged event. Immutable once created: it can be deleted but never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    /// Generated by the recording client so the optimistic row and the stored row share identity
    pub id: Uuid,
    pub match_id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub team: Team,
    /// None for collective (team-level) events
    pub player_id: Option<String>,
    /// Seconds into the video source when the event was tagged
    pub video_timestamp: f64,
    /// Display cache computed at record time, never recomputed
    pub match_minute: Option<u32>,
    /// Absolute clock value at record time, authoritative for time-based stats
    pub game_seconds: Option<u32>,
    pub half: Option<Half>,
    pub created_at: DateTime<Utc>,
}

impl MatchEvent {
    /// Captures a new event against the current clock reading
    pub fn record(
        match_id: &str,
        event_type: EventType,
        team: Team,
        player_id: Option<String>,
        video_timestamp: f64,
        clock: &GameClock,
    ) -> Self {
        let game_seconds = clock.seconds();

        Self {
            id: Uuid::new_v4(),
            match_id: match_id.to_string(),
            event_type,
            team,
            player_id,
            video_timestamp,
            match_minute: Some(match_minute_for(game_seconds)),
            game_seconds: Some(game_seconds),
            half: Some(clock.half()),
            created_at: Utc::now(),
        }
    }

    /// Game second used for derivations, falling back to the minute cache on legacy rows
    pub fn effective_seconds(&self) -> Option<u32> {
        self.game_seconds.or_else(|| {
            self.match_minute
                .map(|minute| minute.saturating_sub(1).saturating_mul(60))
        })
    }

    pub fn is_goal(&self) -> bool {
        self.event_type == EventType::Goal
    }

    pub fn is_collective(&self) -> bool {
        self.player_id.is_none()
    }
}
