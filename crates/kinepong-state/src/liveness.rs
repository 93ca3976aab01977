//! Liveness tracking
//!
//! The stream is live when the last valid frame arrived strictly less than
//! the timeout ago. Before any valid frame it is never live.

use std::time::{Duration, Instant};

use kinepong_core::SharedClock;

/// Default liveness timeout
pub const DEFAULT_LIVENESS_TIMEOUT: Duration = Duration::from_secs(5);

/// Liveness of a stamp against `now`
#[inline]
pub fn is_live_at(last_valid: Option<Instant>, now: Instant, timeout: Duration) -> bool {
    match last_valid {
        Some(stamp) => now.saturating_duration_since(stamp) < timeout,
        None => false,
    }
}

/// Records when the last valid frame arrived
pub struct LivenessTracker {
    clock: SharedClock,
    last_valid: Option<Instant>,
    frames: u64,
}

impl LivenessTracker {
    pub fn new(clock: SharedClock) -> Self {
        LivenessTracker {
            clock,
            last_valid: None,
            frames: 0,
        }
    }

    /// Stamp a valid frame with the current time
    pub fn record_frame(&mut self) -> Instant {
        let now = self.clock.now();
        self.last_valid = Some(now);
        self.frames += 1;
        now
    }

    pub fn is_live(&self, timeout: Duration) -> bool {
        is_live_at(self.last_valid, self.clock.now(), timeout)
    }

    /// Time since the last valid frame, if any
    pub fn since_last_frame(&self) -> Option<Duration> {
        self.last_valid
            .map(|stamp| self.clock.now().saturating_duration_since(stamp))
    }

    pub fn last_valid(&self) -> Option<Instant> {
        self.last_valid
    }

    /// Valid frames recorded so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinepong_core::ManualClock;
    use std::sync::Arc;

    #[test]
    fn test_not_live_before_first_frame() {
        let clock = ManualClock::new();
        let tracker = LivenessTracker::new(Arc::new(clock));
        assert!(!tracker.is_live(DEFAULT_LIVENESS_TIMEOUT));
        assert_eq!(tracker.since_last_frame(), None);
    }

    #[test]
    fn test_live_window_is_strict() {
        let clock = ManualClock::new();
        let mut tracker = LivenessTracker::new(Arc::new(clock.clone()));
        tracker.record_frame();

        clock.advance(Duration::from_millis(4999));
        assert!(tracker.is_live(DEFAULT_LIVENESS_TIMEOUT));

        clock.advance(Duration::from_millis(1));
        assert!(!tracker.is_live(DEFAULT_LIVENESS_TIMEOUT));
    }

    #[test]
    fn test_stale_after_six_seconds() {
        let clock = ManualClock::new();
        let mut tracker = LivenessTracker::new(Arc::new(clock.clone()));
        tracker.record_frame();
        clock.advance(Duration::from_secs(6));

        assert!(!tracker.is_live(DEFAULT_LIVENESS_TIMEOUT));
        assert_eq!(tracker.since_last_frame(), Some(Duration::from_secs(6)));
    }

    #[test]
    fn test_new_frame_restores_liveness() {
        let clock = ManualClock::new();
        let mut tracker = LivenessTracker::new(Arc::new(clock.clone()));
        tracker.record_frame();
        clock.advance(Duration::from_secs(10));
        tracker.record_frame();

        assert!(tracker.is_live(DEFAULT_LIVENESS_TIMEOUT));
        assert_eq!(tracker.frames(), 2);
    }
}
