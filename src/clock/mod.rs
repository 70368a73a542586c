// Match clock: absolute game seconds plus the half boundary

// Public API - what other modules can use
pub use game_clock::{
    format_clock, match_minute_for, ClockTick, ClockToggle, GameClock, DEFAULT_CLOCK_FLUSH_EVERY,
};
pub use half::{Half, InvalidHalf};

// Internal modules
mod game_clock;
mod half;
