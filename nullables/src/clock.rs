//! Nullable clock: deterministic time for testing.

use econexus_types::{Clock, Timestamp};
use std::sync::atomic::{AtomicU64, Ordering};

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to. Shareable across threads so a test
/// can keep an `Arc` and move time while the store under test holds another.
pub struct NullClock {
    current_ms: AtomicU64,
}

impl NullClock {
    pub fn new(initial_ms: u64) -> Self {
        Self {
            current_ms: AtomicU64::new(initial_ms),
        }
    }

    /// Advance time by a number of milliseconds.
    pub fn advance(&self, millis: u64) {
        self.current_ms.fetch_add(millis, Ordering::SeqCst);
    }

    /// Advance time by whole days.
    pub fn advance_days(&self, days: u64) {
        self.advance(days * econexus_types::time::MS_PER_DAY);
    }

    /// Set the time to a specific value.
    pub fn set(&self, millis: u64) {
        self.current_ms.store(millis, Ordering::SeqCst);
    }
}

impl Clock for NullClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.current_ms.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_moves_when_told() {
        let clock = NullClock::new(1_000);
        assert_eq!(clock.now().as_millis(), 1_000);
        clock.advance(500);
        assert_eq!(clock.now().as_millis(), 1_500);
        clock.advance_days(1);
        assert_eq!(clock.now().as_millis(), 1_500 + 86_400_000);
        clock.set(7);
        assert_eq!(clock.now().as_millis(), 7);
    }
}
