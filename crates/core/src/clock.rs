//! Injectable source of "now".
//!
//! Rules that compare against the current instant take a [`Clock`] instead of
//! calling `Utc::now()` so tests can pin time.

use std::sync::RwLock;

use chrono::Utc;

use crate::types::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// A clock frozen at a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<Timestamp>,
}

impl FixedClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn set(&self, now: Timestamp) {
        *self.now.write().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_returns_pinned_instant() {
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let clock = FixedClock::new(t);
        assert_eq!(clock.now(), t);
    }

    #[test]
    fn fixed_clock_advances() {
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let clock = FixedClock::new(t);
        clock.advance(chrono::Duration::minutes(90));
        assert_eq!(clock.now(), t + chrono::Duration::minutes(90));
    }
}
