use async_trait::async_trait;
use thiserror::Error;

use super::changes::MatchChange;

/// Errors that can occur when handling match changes
#[derive(Debug, Error)]
pub enum ChangeHandlerError {
    #[error("Change for another match: {0}")]
    WrongMatch(String),

    #[error("Handler error: {0}")]
    HandlerError(String),
}

/// Trait for components that react to changes of one match
///
/// Handlers should be idempotent: the same change may be delivered twice.
#[async_trait]
pub trait MatchChangeHandler: Send + Sync {
    async fn handle_change(
        &self,
        match_id: &str,
        change: MatchChange,
    ) -> Result<(), ChangeHandlerError>;

    /// Called after the subscription fell behind and changes were dropped.
    /// Handlers that keep state derived from the stream rebuild it here.
    async fn resync(&self, _match_id: &str) -> Result<(), ChangeHandlerError> {
        Ok(())
    }

    /// Get a human-readable name for this handler (for logging/debugging)
    fn handler_name(&self) -> &'static str;
}
