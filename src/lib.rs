// Library crate for the match tagging console
// This file exposes the public API for the server binary and integration tests

pub mod api;
pub mod clock;
pub mod config;
pub mod console;
pub mod event;
pub mod notify;
pub mod possession;
pub mod roster;
pub mod session;
pub mod shared;
pub mod stats;
pub mod store;
pub mod sync;
pub mod timeline;
pub mod video;

// Re-export commonly used types for easier access in tests
pub use clock::{GameClock, Half};
pub use config::{ConfigError, ConsoleConfig};
pub use console::{Confirmation, ConsoleError, ConsoleManager, ConsoleSettings, MatchConsole};
pub use event::{EventBus, MatchChange};
pub use possession::PossessionState;
pub use session::{ConsoleSession, Role};
pub use shared::{AppError, AppState};
pub use stats::{MatchStats, StatsEngine};
pub use store::{InMemoryMatchStore, MatchPatch, MatchRecord, MatchStore, PostgresMatchStore, StoreError};
pub use timeline::{EventTimeline, EventType, MatchEvent, Team};
