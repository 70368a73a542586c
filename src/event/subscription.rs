use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{changes::MatchChange, handler::MatchChangeHandler};

/// Routes a match's change stream to a handler
pub struct MatchSubscription {
    match_id: String,
    handler: Arc<dyn MatchChangeHandler>,
    receiver: broadcast::Receiver<MatchChange>,
}

impl MatchSubscription {
    pub fn new(
        match_id: String,
        handler: Arc<dyn MatchChangeHandler>,
        receiver: broadcast::Receiver<MatchChange>,
    ) -> Self {
        Self {
            match_id,
            handler,
            receiver,
        }
    }

    /// Start the subscription - spawns a background task that listens to match
    /// changes and routes them to the handler
    pub fn start(self) -> SubscriptionHandle {
        let match_id = self.match_id.clone();
        let handler_name = self.handler.handler_name();

        info!(
            match_id = %match_id,
            handler = handler_name,
            "Starting match subscription"
        );

        let mut receiver = self.receiver;
        let handler = self.handler;
        let task_match_id = match_id.clone();

        let task = tokio::spawn(async move {
            loop {
                let change = match receiver.recv().await {
                    Ok(change) => change,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(
                            match_id = %task_match_id,
                            handler = handler_name,
                            skipped = skipped,
                            "Match subscription lagged, resyncing"
                        );
                        if let Err(e) = handler.resync(&task_match_id).await {
                            warn!(
                                match_id = %task_match_id,
                                handler = handler_name,
                                error = %e,
                                "Resync after lag failed"
                            );
                        }
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                if let Err(e) = handler.handle_change(&task_match_id, change).await {
                    warn!(
                        match_id = %task_match_id,
                        handler = handler_name,
                        error = %e,
                        "Match change handler failed"
                    );
                }
            }

            info!(
                match_id = %task_match_id,
                handler = handler_name,
                "Match subscription ended - channel closed"
            );
        });

        SubscriptionHandle {
            match_id,
            handler_name,
            task,
        }
    }
}

/// Owns a running subscription. Releasing (or dropping) it stops delivery.
pub struct SubscriptionHandle {
    match_id: String,
    handler_name: &'static str,
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops delivery and waits until the task, and its receiver, are gone
    pub async fn release(mut self) {
        info!(
            match_id = %self.match_id,
            handler = self.handler_name,
            "Releasing match subscription"
        );
        self.task.abort();
        let _ = (&mut self.task).await;
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
