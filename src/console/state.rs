use serde::Serialize;

use crate::clock::{GameClock, Half};
use crate::possession::PossessionState;
use crate::roster::{Player, Roster};
use crate::stats::StatsContext;
use crate::store::MatchRecord;
use crate::timeline::{EventTimeline, MatchEvent, Team};

/// Everything one console holds locally for a match
#[derive(Debug, Clone)]
pub struct LiveMatchState {
    /// Last known match row. Scores here track the persisted fields.
    pub record: MatchRecord,
    pub clock: GameClock,
    pub possession: PossessionState,
    pub timeline: EventTimeline,
    pub roster: Roster,
}

impl LiveMatchState {
    /// Resumes from persisted state. The clock keeps the stored running flag;
    /// no side is in possession.
    pub fn from_loaded(record: MatchRecord, events: Vec<MatchEvent>, players: Vec<Player>) -> Self {
        let mut clock =
            GameClock::restore(record.clock_seconds, record.half, record.half_split_seconds);
        clock.set_running(record.clock_running);
        let possession = PossessionState::restore(record.possession_home, record.possession_away);

        Self {
            record,
            clock,
            possession,
            timeline: EventTimeline::from_events(events),
            roster: Roster::from_players(players),
        }
    }

    /// Replaces local state with a fresh read of the store.
    ///
    /// The stored row wins, except where this console is ahead of its own
    /// best-effort flushes: a clock running on both sides keeps the larger
    /// second, and the side in possession keeps its larger bucket. The
    /// active possession side is local only and survives.
    pub fn rebase(&mut self, record: MatchRecord, events: Vec<MatchEvent>, players: Vec<Player>) {
        let mut fresh = Self::from_loaded(record, events, players);

        if self.clock.running() && fresh.clock.running() {
            let seconds = self.clock.seconds().max(fresh.clock.seconds());
            fresh.clock.set_seconds(seconds);
        }

        if let Some(team) = self.possession.active() {
            let seconds = self.possession.bucket(team).max(fresh.possession.bucket(team));
            fresh.possession.set_bucket(team, seconds);
            fresh.possession.set_active(Some(team));
        }

        *self = fresh;
    }

    pub fn stats_context(&self) -> StatsContext<'_> {
        StatsContext::new(&self.timeline, &self.clock, &self.possession)
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            match_id: self.record.id.clone(),
            home_team: self.record.home_team.clone(),
            away_team: self.record.away_team.clone(),
            home_score: self.record.home_score,
            away_score: self.record.away_score,
            clock: ClockView {
                seconds: self.clock.seconds(),
                running: self.clock.running(),
                display: self.clock.display(),
                half: self.clock.half(),
                half_display: self.clock.half_display(),
                half_split_seconds: self.clock.half_split_seconds(),
                match_minute: self.clock.match_minute(),
            },
            possession: PossessionView {
                home: self.possession.home(),
                away: self.possession.away(),
                active: self.possession.active(),
            },
            events: self.timeline.events().to_vec(),
            players: self.roster_view(),
        }
    }

    fn roster_view(&self) -> Vec<PlayerView> {
        [Team::Home, Team::Away]
            .into_iter()
            .flat_map(|team| self.roster.players_for(team))
            .map(|player| PlayerView {
                player: player.clone(),
                on_pitch: self
                    .roster
                    .on_pitch(&player.id, &self.timeline)
                    .unwrap_or(player.starter),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClockView {
    pub seconds: u32,
    pub running: bool,
    pub display: String,
    pub half: Half,
    pub half_display: String,
    pub half_split_seconds: Option<u32>,
    pub match_minute: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PossessionView {
    pub home: u32,
    pub away: u32,
    pub active: Option<Team>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    #[serde(flatten)]
    pub player: Player,
    pub on_pitch: bool,
}

/// Serializable view of a console's local state
#[derive(Debug, Clone, Serialize)]
pub struct MatchSnapshot {
    pub match_id: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub clock: ClockView,
    pub possession: PossessionView,
    /// Newest first
    pub events: Vec<MatchEvent>,
    pub players: Vec<PlayerView>,
}
