mod event_counts;
mod player_lines;
mod possession_share;
mod shot_timing;

pub use event_counts::{live_score, score_mismatches, EventCountCalculator};
pub use player_lines::PlayerLineCalculator;
pub use possession_share::{share, PossessionCalculator};
pub use shot_timing::{time_since_last_shot, ShotTimingCalculator};
