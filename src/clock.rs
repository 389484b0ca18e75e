//! Round countdown timing
//!
//! The clock never reads a wall clock itself; callers pass in monotonic
//! millisecond timestamps, which keeps round timing independent of render
//! frame rate and makes the module trivially testable.

/// Countdown clock for a single round.
#[derive(Debug, Clone, Copy)]
pub struct RoundClock {
    start_ms: u64,
    duration_ms: u64,
}

impl RoundClock {
    /// Create a clock for rounds of the given length.
    pub fn new(duration_ms: u64) -> Self {
        Self {
            start_ms: 0,
            duration_ms,
        }
    }

    /// Begin a fresh round at `now_ms`.
    pub fn start(&mut self, now_ms: u64) {
        self.start_ms = now_ms;
    }

    /// Begin a resumed round with `remaining_ms` left on the clock.
    ///
    /// Reconstructs the start timestamp so that `elapsed` picks up where the
    /// saved round left off. A remaining value larger than the round length
    /// is clamped to a fresh round.
    pub fn start_from_remaining(&mut self, now_ms: u64, remaining_ms: u64) {
        let remaining = remaining_ms.min(self.duration_ms);
        self.start_ms = now_ms.saturating_sub(self.duration_ms - remaining);
    }

    /// Milliseconds elapsed since the round started.
    pub fn elapsed(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.start_ms)
    }

    /// Milliseconds left in the round, saturating at zero.
    pub fn remaining(&self, now_ms: u64) -> u64 {
        self.duration_ms.saturating_sub(self.elapsed(now_ms))
    }

    /// Whether the round length has fully elapsed.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.elapsed(now_ms) >= self.duration_ms
    }

    /// Configured round length.
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_round_counts_down() {
        let mut clock = RoundClock::new(60_000);
        clock.start(1_000);

        assert_eq!(clock.elapsed(1_000), 0);
        assert_eq!(clock.remaining(1_000), 60_000);
        assert_eq!(clock.remaining(31_000), 30_000);
        assert!(!clock.is_expired(60_999));
        assert!(clock.is_expired(61_000));
        assert!(clock.is_expired(90_000));
    }

    #[test]
    fn test_remaining_saturates_at_zero() {
        let mut clock = RoundClock::new(60_000);
        clock.start(0);

        assert_eq!(clock.remaining(65_000), 0);
    }

    #[test]
    fn test_resume_reconstructs_elapsed_time() {
        let mut clock = RoundClock::new(60_000);
        clock.start_from_remaining(100_000, 30_000);

        assert_eq!(clock.remaining(100_000), 30_000);
        assert_eq!(clock.elapsed(100_000), 30_000);
        assert!(!clock.is_expired(129_999));
        assert!(clock.is_expired(130_000));
    }

    #[test]
    fn test_resume_clamps_oversized_remaining() {
        let mut clock = RoundClock::new(60_000);
        clock.start_from_remaining(5_000, 90_000);

        assert_eq!(clock.remaining(5_000), 60_000);
    }

    #[test]
    fn test_timestamps_before_start_read_as_zero_elapsed() {
        let mut clock = RoundClock::new(60_000);
        clock.start(10_000);

        assert_eq!(clock.elapsed(9_000), 0);
        assert_eq!(clock.remaining(9_000), 60_000);
    }
}
