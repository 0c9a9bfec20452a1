//! Time source used by the stores and the order lifecycle.

use chrono::{DateTime, Utc};

/// Abstraction over "now" so record timestamps can be pinned in tests.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that always returns the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}

#[cfg(test)]
pub(crate) fn test_clock() -> FixedClock {
    use chrono::TimeZone;
    FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 8, 30, 0).unwrap())
}
