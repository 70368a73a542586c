use serde::{Deserialize, Serialize};

use crate::clock::Half;
use crate::console::{ClockView, PossessionView};
use crate::timeline::{EventType, Team};

#[derive(Debug, Clone, Deserialize)]
pub struct AddEventRequest {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub team: Team,
    #[serde(default)]
    pub player_id: Option<String>,
}

/// `?confirm=true` on destructive routes; anything else cancels
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// Minutes typed by the operator, as text or as a JSON number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MinutesInput {
    Number(serde_json::Number),
    Text(String),
}

impl MinutesInput {
    pub fn as_input(&self) -> String {
        match self {
            MinutesInput::Number(number) => number.to_string(),
            MinutesInput::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditMinutesRequest {
    pub minutes: MinutesInput,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetHalfRequest {
    pub half: Half,
}

/// `null` or a missing team stops possession
#[derive(Debug, Clone, Deserialize)]
pub struct SetPossessionRequest {
    #[serde(default)]
    pub team: Option<Team>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayheadReport {
    pub seconds: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteEventResponse {
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClockResponse {
    /// False when the request changed nothing (cancelled or ignored input)
    pub applied: bool,
    pub clock: ClockView,
}

#[derive(Debug, Clone, Serialize)]
pub struct PossessionResponse {
    pub changed: bool,
    pub possession: PossessionView,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeekResponse {
    pub video_timestamp: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseResponse {
    pub released: bool,
}
