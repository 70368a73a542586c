use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::timeline::Team;

/// Database model for the players table
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub match_id: String,
    #[sqlx(try_from = "String")]
    pub team: Team,
    pub jersey_number: i16,
    pub name: String,
    pub starter: bool,
}
