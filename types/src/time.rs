//! Timestamp and clock types.
//!
//! All timestamps are Unix epoch **milliseconds** (UTC), matching the
//! resolution of the browser clock the stored data was first written with.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds in one second.
pub const MS_PER_SECOND: u64 = 1_000;
/// Milliseconds in one minute.
pub const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
/// Milliseconds in one hour.
pub const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
/// Milliseconds in one day.
pub const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// A Unix timestamp in milliseconds since epoch (UTC).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Get the current system time as a `Timestamp`.
    ///
    /// A system clock set before the epoch reads as [`Timestamp::EPOCH`].
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        Self(millis)
    }

    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    pub const fn as_secs(&self) -> u64 {
        self.0 / MS_PER_SECOND
    }

    /// Milliseconds elapsed since this timestamp, relative to `now`.
    /// Zero if `now` is earlier.
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }

    pub fn plus_millis(&self, millis: u64) -> Self {
        Self(self.0.saturating_add(millis))
    }

    pub fn minus_millis(&self, millis: u64) -> Self {
        Self(self.0.saturating_sub(millis))
    }

    pub fn plus_days(&self, days: u64) -> Self {
        self.plus_millis(days.saturating_mul(MS_PER_DAY))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Source of the current time.
///
/// Injected into every component that needs "now" so tests can drive time
/// deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_saturates() {
        let t = Timestamp::from_millis(5_000);
        assert_eq!(t.elapsed_since(Timestamp::from_millis(7_500)), 2_500);
        assert_eq!(t.elapsed_since(Timestamp::from_millis(1_000)), 0);
    }

    #[test]
    fn day_arithmetic() {
        let t = Timestamp::from_millis(0).plus_days(7);
        assert_eq!(t.as_millis(), 7 * 86_400_000);
        assert_eq!(t.minus_millis(u64::MAX), Timestamp::EPOCH);
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now().as_millis() > 1_577_836_800_000);
    }
}
