use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Seconds in one day.
pub const DAY_SECS: u64 = 86_400;

/// An instant in registry time: whole seconds since the UNIX epoch.
///
/// The registry never reads the wall clock directly; every operation samples
/// its [`Clock`] exactly once and threads the resulting `Timestamp` through
/// the transition. Ordering is the plain integer ordering.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch instant.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw seconds-since-epoch value.
    pub const fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Raw seconds since the epoch.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// This instant moved forward by `secs`, saturating at the maximum.
    pub fn saturating_add_secs(self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    /// This instant moved forward by a whole number of days.
    pub fn saturating_add_days(self, days: u64) -> Self {
        self.saturating_add_secs(days.saturating_mul(DAY_SECS))
    }

    /// Seconds from `self` until `later`, or zero if `later` is not later.
    pub fn secs_until(self, later: Self) -> u64 {
        later.0.saturating_sub(self.0)
    }
}

impl From<u64> for Timestamp {
    fn from(secs: u64) -> Self {
        Self(secs)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}s)", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Monotone non-decreasing time source.
///
/// Implementations must never move backwards between successive `now()`
/// calls observed by the same registry.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time source for production embedding.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Timestamp::new(secs)
    }
}

/// Manually advanced time source for deterministic tests and demos.
///
/// Cloning shares the underlying instant, so a test can hold one handle
/// while the registry holds another.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    secs: Arc<AtomicU64>,
}

impl ManualClock {
    /// Start at the given instant.
    pub fn starting_at(start: Timestamp) -> Self {
        Self {
            secs: Arc::new(AtomicU64::new(start.get())),
        }
    }

    /// Move time forward by `secs`.
    pub fn advance(&self, secs: u64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }

    /// Move time forward by a whole number of days.
    pub fn advance_days(&self, days: u64) {
        self.advance(days * DAY_SECS);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.secs.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_integer_ordering() {
        assert!(Timestamp::new(100) < Timestamp::new(200));
        assert_eq!(Timestamp::new(100), Timestamp::new(100));
    }

    #[test]
    fn saturating_arithmetic() {
        let t = Timestamp::new(u64::MAX);
        assert_eq!(t.saturating_add_secs(10), t);
        assert_eq!(
            Timestamp::new(100).saturating_add_days(2),
            Timestamp::new(100 + 2 * DAY_SECS)
        );
    }

    #[test]
    fn secs_until_clamps_at_zero() {
        let early = Timestamp::new(100);
        let late = Timestamp::new(250);
        assert_eq!(early.secs_until(late), 150);
        assert_eq!(late.secs_until(early), 0);
    }

    #[test]
    fn system_clock_is_past_2020() {
        let now = SystemClock.now();
        assert!(now > Timestamp::new(1_577_836_800)); // 2020-01-01
    }

    #[test]
    fn manual_clock_advances_and_shares_state() {
        let clock = ManualClock::starting_at(Timestamp::new(1_000));
        let handle = clock.clone();
        clock.advance(500);
        assert_eq!(handle.now(), Timestamp::new(1_500));
        handle.advance_days(1);
        assert_eq!(clock.now(), Timestamp::new(1_500 + DAY_SECS));
    }

    #[test]
    fn serde_roundtrip() {
        let t = Timestamp::new(1_234_567_890);
        let json = serde_json::to_string(&t).unwrap();
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(t, parsed);
    }

    #[test]
    fn display_format() {
        assert_eq!(format!("{}", Timestamp::new(42)), "42s");
    }
}
