use serde::{Deserialize, Serialize};
use tracing::debug;

use super::half::Half;

/// Default number of ticks between clock flushes to the shared store
pub const DEFAULT_CLOCK_FLUSH_EVERY: u32 = 10;

/// Match minute shown for a given game second (minute 1 covers 0..60)
pub fn match_minute_for(seconds: u32) -> u32 {
    seconds / 60 + 1
}

/// Formats game seconds as MM:SS; minutes are not wrapped at 60
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Result of flipping the clock between running and paused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockToggle {
    Started,
    /// The clock stopped; `seconds` must be flushed to the store
    Paused { seconds: u32 },
}

/// Result of a one-second tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    /// The clock is paused, nothing advanced
    Idle,
    Advanced { seconds: u32 },
    /// Advanced onto a flush boundary; `seconds` should be written to the store
    Flush { seconds: u32 },
}

impl ClockTick {
    pub fn is_idle(&self) -> bool {
        matches!(self, ClockTick::Idle)
    }
}

/// Game clock for one match
///
/// `seconds` is independent of wall-clock time and only advances through
/// `tick` while running. The half split is the `seconds` value captured when
/// the second half began; once set it is never cleared locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GameClock {
    seconds: u32,
    running: bool,
    half: Half,
    half_split_seconds: Option<u32>,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a paused clock from persisted values
    pub fn restore(seconds: u32, half: Half, half_split_seconds: Option<u32>) -> Self {
        Self {
            seconds,
            running: false,
            half,
            half_split_seconds,
        }
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn half(&self) -> Half {
        self.half
    }

    pub fn half_split_seconds(&self) -> Option<u32> {
        self.half_split_seconds
    }

    pub fn toggle(&mut self) -> ClockToggle {
        self.running = !self.running;
        if self.running {
            ClockToggle::Started
        } else {
            ClockToggle::Paused {
                seconds: self.seconds,
            }
        }
    }

    /// Advances one game second while running. Every `flush_every`-th second
    /// is reported as a flush point.
    pub fn tick(&mut self, flush_every: u32) -> ClockTick {
        if !self.running {
            return ClockTick::Idle;
        }

        self.seconds = self.seconds.saturating_add(1);
        if flush_every > 0 && self.seconds % flush_every == 0 {
            ClockTick::Flush {
                seconds: self.seconds,
            }
        } else {
            ClockTick::Advanced {
                seconds: self.seconds,
            }
        }
    }

    pub fn reset(&mut self) {
        self.seconds = 0;
        self.running = false;
    }

    /// Replaces the minutes component while keeping the seconds within the minute.
    ///
    /// Returns the new value, or None when the input is not a non-negative
    /// integer (the clock is left untouched).
    pub fn edit_minutes(&mut self, input: &str) -> Option<u32> {
        let minutes = match input.trim().parse::<u32>() {
            Ok(minutes) => minutes,
            Err(_) => {
                debug!(input = %input, "Ignoring non-numeric minute edit");
                return None;
            }
        };

        let seconds = minutes
            .checked_mul(60)
            .and_then(|base| base.checked_add(self.seconds % 60))?;
        self.seconds = seconds;
        Some(seconds)
    }

    pub fn set_half(&mut self, half: Half) {
        self.half = half;
    }

    /// Records the current second as the half split if none exists yet.
    /// Returns the split when it was newly recorded.
    pub fn mark_half_split(&mut self) -> Option<u32> {
        if self.half_split_seconds.is_some() {
            return None;
        }
        self.half_split_seconds = Some(self.seconds);
        self.half_split_seconds
    }

    /// Seconds elapsed within the current half
    pub fn time_in_half(&self) -> u32 {
        match (self.half, self.half_split_seconds) {
            (Half::First, Some(split)) => self.seconds.min(split),
            (Half::First, None) => self.seconds,
            (Half::Second, split) => self.seconds.saturating_sub(split.unwrap_or(0)),
        }
    }

    pub fn match_minute(&self) -> u32 {
        match_minute_for(self.seconds)
    }

    pub fn display(&self) -> String {
        format_clock(self.seconds)
    }

    pub fn half_display(&self) -> String {
        format_clock(self.time_in_half())
    }

    // Remote overwrites; these bypass the toggle/tick rules.

    pub fn set_seconds(&mut self, seconds: u32) {
        self.seconds = seconds;
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn set_half_split(&mut self, split: Option<u32>) {
        self.half_split_seconds = split;
    }
}
