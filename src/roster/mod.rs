// Match rosters: the player lookup table events refer to by id

pub use models::Player;
pub use roster::Roster;

mod models;
#[allow(clippy::module_inception)]
mod roster;
