use std::collections::HashMap;

use crate::timeline::{EventTimeline, EventType, Team};

use super::models::Player;

/// Players for one match, keyed by id
#[derive(Debug, Clone, Default)]
pub struct Roster {
    players: HashMap<String, Player>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_players(players: Vec<Player>) -> Self {
        Self {
            players: players.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    pub fn get(&self, player_id: &str) -> Option<&Player> {
        self.players.get(player_id)
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.players.contains_key(player_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Players of one team ordered by jersey number
    pub fn players_for(&self, team: Team) -> Vec<&Player> {
        let mut players: Vec<&Player> = self.players.values().filter(|p| p.team == team).collect();
        players.sort_by_key(|p| p.jersey_number);
        players
    }

    /// Whether a player is currently on the pitch.
    ///
    /// The most recent substitution event for the player decides; without one
    /// the starter flag does.
    pub fn on_pitch(&self, player_id: &str, timeline: &EventTimeline) -> Option<bool> {
        let player = self.get(player_id)?;

        let from_substitutions = timeline
            .iter()
            .filter(|e| e.player_id.as_deref() == Some(player_id))
            .find_map(|e| match e.event_type {
                EventType::SubstitutionIn => Some(true),
                EventType::SubstitutionOut => Some(false),
                _ => None,
            });

        Some(from_substitutions.unwrap_or(player.starter))
    }

    /// Players of a team currently on the pitch, by jersey number
    pub fn lineup(&self, team: Team, timeline: &EventTimeline) -> Vec<&Player> {
        self.players_for(team)
            .into_iter()
            .filter(|p| self.on_pitch(&p.id, timeline).unwrap_or(false))
            .collect()
    }
}
