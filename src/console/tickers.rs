use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// Which repeating timer a ticker drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerKind {
    Clock,
    Possession,
}

impl TickerKind {
    fn name(self) -> &'static str {
        match self {
            TickerKind::Clock => "clock",
            TickerKind::Possession => "possession",
        }
    }
}

/// A one-second repeating timer.
///
/// The first step runs one period after spawning. The task ends when a step
/// returns false, and is aborted when the ticker is stopped or dropped.
pub struct Ticker {
    kind: TickerKind,
    match_id: String,
    task: JoinHandle<()>,
}

impl Ticker {
    pub fn spawn<F, Fut>(kind: TickerKind, match_id: &str, period: Duration, mut step: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        debug!(match_id = %match_id, ticker = kind.name(), "Starting ticker");

        let task_match_id = match_id.to_string();
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if !step().await {
                    break;
                }
            }

            debug!(match_id = %task_match_id, ticker = kind.name(), "Ticker finished");
        });

        Self {
            kind,
            match_id: match_id.to_string(),
            task,
        }
    }

    pub fn kind(&self) -> TickerKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(self) {
        debug!(match_id = %self.match_id, ticker = self.kind.name(), "Stopping ticker");
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
