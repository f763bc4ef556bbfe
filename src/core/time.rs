//! Frame timing

use std::time::{Duration, Instant};

/// Tracks frame deltas and total running time
#[derive(Debug, Clone)]
pub struct Time {
    /// Instant of the last `update` (or `resync`)
    last_frame: Instant,
    /// Delta between the last two frames
    delta: Duration,
    /// Sum of all deltas seen so far
    elapsed: Duration,
    /// Number of frames recorded
    frame_count: u64,
}

impl Time {
    /// Create a new time tracker starting now
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advance to the current instant
    pub fn update(&mut self) {
        let now = Instant::now();
        self.advance(now.saturating_duration_since(self.last_frame));
        self.last_frame = now;
    }

    /// Advance by an explicit delta
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
    }

    /// Forget the time since the last frame.
    ///
    /// Called when frames resume after the window was hidden so the next
    /// delta does not include the hidden interval.
    pub fn resync(&mut self) {
        self.last_frame = Instant::now();
        self.delta = Duration::ZERO;
    }

    /// Delta of the last frame
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Total time accumulated through `update`/`advance`
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of frames recorded
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates() {
        let mut time = Time::new();
        time.advance(Duration::from_millis(16));
        time.advance(Duration::from_millis(17));

        assert_eq!(time.delta(), Duration::from_millis(17));
        assert_eq!(time.elapsed(), Duration::from_millis(33));
        assert_eq!(time.frame_count(), 2);
    }

    #[test]
    fn test_resync_clears_delta() {
        let mut time = Time::new();
        time.advance(Duration::from_secs(5));
        time.resync();

        assert_eq!(time.delta(), Duration::ZERO);
        assert_eq!(time.elapsed(), Duration::from_secs(5));
    }
}
