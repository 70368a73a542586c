use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A user-visible message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            at: Utc::now(),
        }
    }
}

/// Surfaces notices to whoever is operating the console
pub trait OperatorNotifier: Send + Sync {
    fn notify(&self, match_id: &str, notice: Notice);
}

/// Notifier that only writes notices to the log
pub struct TracingNotifier;

impl OperatorNotifier for TracingNotifier {
    fn notify(&self, match_id: &str, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => info!(match_id = %match_id, message = %notice.message, "Operator notice"),
            NoticeLevel::Error => warn!(match_id = %match_id, message = %notice.message, "Operator notice"),
        }
    }
}
