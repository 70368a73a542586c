use std::sync::atomic::{AtomicU64, Ordering};

/// The two playback operations the console consumes
pub trait VideoSource: Send + Sync {
    /// Seconds into the video at this moment
    fn current_time(&self) -> f64;

    fn seek_to(&self, seconds: f64);
}

/// Playhead position reported by the video front end.
///
/// The UI reports its position as it plays; seeks move the stored position
/// and the UI follows it on its next poll.
#[derive(Debug, Default)]
pub struct SharedPlayhead {
    // f64 bits
    position: AtomicU64,
}

impl SharedPlayhead {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(seconds: f64) -> Self {
        let playhead = Self::new();
        playhead.report(seconds);
        playhead
    }

    /// Records the position reported by the player; negative or NaN becomes 0
    pub fn report(&self, seconds: f64) {
        let seconds = if seconds.is_finite() && seconds > 0.0 {
            seconds
        } else {
            0.0
        };
        self.position.store(seconds.to_bits(), Ordering::Relaxed);
    }
}

impl VideoSource for SharedPlayhead {
    fn current_time(&self) -> f64 {
        f64::from_bits(self.position.load(Ordering::Relaxed))
    }

    fn seek_to(&self, seconds: f64) {
        self.report(seconds);
    }
}
