use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Role supplied by the identity service; only gates which actions are offered
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Role {
    #[default]
    Operator,
    Coach,
    Spectator,
}

impl Role {
    /// Only operators record events and drive the clock
    pub fn can_tag(self) -> bool {
        matches!(self, Role::Operator)
    }

    pub fn can_view_stats(self) -> bool {
        matches!(self, Role::Operator | Role::Coach)
    }
}
