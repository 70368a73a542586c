use thiserror::Error;
use uuid::Uuid;

use crate::session::Role;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Role {0} may not change the match")]
    NotPermitted(Role),

    #[error("Unknown match: {0}")]
    UnknownMatch(String),

    #[error("Unknown event: {0}")]
    UnknownEvent(Uuid),

    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    #[error("Could not save change, it was reverted: {0}")]
    PersistFailed(StoreError),

    #[error("Score update failed, event change was reverted: {0}")]
    ScoreSyncFailed(StoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
