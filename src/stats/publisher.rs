use std::sync::Arc;

use tokio::sync::watch;

use super::{MatchStats, StatsContext, StatsEngine};

/// Recomputes stats and fans the latest snapshot out to watchers
#[derive(Clone)]
pub struct StatsPublisher {
    engine: Arc<StatsEngine>,
    sender: Arc<watch::Sender<MatchStats>>,
}

impl StatsPublisher {
    pub fn new(engine: Arc<StatsEngine>) -> Self {
        let (sender, _) = watch::channel(MatchStats::default());
        Self {
            engine,
            sender: Arc::new(sender),
        }
    }

    pub fn publish(&self, context: &StatsContext) -> MatchStats {
        let stats = self.engine.compute(context);
        self.sender.send_replace(stats.clone());
        stats
    }

    pub fn subscribe(&self) -> watch::Receiver<MatchStats> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> MatchStats {
        self.sender.borrow().clone()
    }
}
