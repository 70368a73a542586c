// Operator notices for non-fatal failures (rolled-back writes and the like)

pub use notifier::{Notice, NoticeLevel, OperatorNotifier, TracingNotifier};

mod notifier;
