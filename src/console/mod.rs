// Match console
//
// The operator-facing facade over one match: optimistic local mutations,
// rollback on failed writes, the goal/score saga and the two one-second
// timers. `ConsoleManager` keeps one console per match.

mod errors;
mod manager;
mod service;
mod state;
mod tickers;

pub use errors::ConsoleError;
pub use manager::{ConsoleManager, ManagedConsole};
pub use service::{Confirmation, ConsoleSettings, MatchConsole, MatchConsoleBuilder};
pub use state::{ClockView, LiveMatchState, MatchSnapshot, PlayerView, PossessionView};
pub use tickers::{Ticker, TickerKind};
