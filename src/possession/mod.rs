// Possession accumulator: two exclusive time buckets driven by an active side

// Public API - what other modules can use
pub use accumulator::{PossessionState, PossessionTick, DEFAULT_POSSESSION_FLUSH_EVERY};

// Internal modules
mod accumulator;
