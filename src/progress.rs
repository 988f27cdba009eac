use tracing::debug;

/// Observer notified of recording progress
///
/// The seam the UI layer subscribes to; recording logic never touches
/// presentation state directly.
pub trait ProgressObserver: Send + Sync {
    /// One second of recording elapsed
    fn on_tick(&self, seconds: u32);

    /// Recording stopped; progress returned to zero
    fn on_reset(&self);
}

/// Bounded once-per-second counter backing the progress display
#[derive(Debug)]
pub struct ProgressCounter {
    value: u32,
    cap: u32,
}

impl ProgressCounter {
    /// Create a counter saturating at `cap`
    #[must_use]
    pub const fn new(cap: u32) -> Self {
        Self { value: 0, cap }
    }

    /// Advance by one tick, saturating at the cap; returns the new value
    pub fn increment(&mut self) -> u32 {
        self.value = (self.value + 1).min(self.cap);
        self.value
    }

    /// Reset to exactly zero
    pub fn reset(&mut self) {
        self.value = 0;
    }

    /// Current value
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }
}

/// Default observer that reports progress through the log
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_tick(&self, seconds: u32) {
        debug!(seconds, "recording progress");
    }

    fn on_reset(&self) {
        debug!("recording progress reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increments_by_one_per_tick() {
        let mut counter = ProgressCounter::new(300);
        for expected in 1..=5 {
            assert_eq!(counter.increment(), expected);
        }
        assert_eq!(counter.value(), 5);
    }

    #[test]
    fn test_saturates_at_cap() {
        let mut counter = ProgressCounter::new(3);
        for _ in 0..10 {
            counter.increment();
        }
        assert_eq!(counter.value(), 3);
    }

    #[test]
    fn test_reset_returns_to_exactly_zero() {
        let mut counter = ProgressCounter::new(300);
        counter.increment();
        counter.increment();
        counter.reset();
        assert_eq!(counter.value(), 0);

        // Counting resumes from zero after a reset
        assert_eq!(counter.increment(), 1);
    }
}
