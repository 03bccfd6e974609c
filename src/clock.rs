//! Wall-clock source for report timestamps
//!
//! Deadlines use `tokio::time::Instant`; this clock only stamps reports, so
//! tests can pin `started_at`/`finished_at`.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that delegates to `chrono::Utc::now()`
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Mock clock for testing; every read advances by a fixed step
#[cfg(test)]
pub struct MockClock {
    now: std::sync::Mutex<DateTime<Utc>>,
    step: chrono::Duration,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl MockClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::stepping(now, chrono::Duration::zero())
    }

    pub fn stepping(now: DateTime<Utc>, step: chrono::Duration) -> Self {
        Self {
            now: std::sync::Mutex::new(now),
            step,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        let mut now = self.now.lock().expect("MockClock lock poisoned");
        let current = *now;
        *now += self.step;
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_returns_time() {
        let now = SystemClock.now();
        // After 2020-01-01
        assert!(now.timestamp() > 1_577_836_800);
    }

    #[test]
    fn test_mock_clock_returns_fixed_time() {
        let fixed = Utc::now();
        let clock = MockClock::new(fixed);
        assert_eq!(clock.now(), fixed);
        assert_eq!(clock.now(), fixed);
    }

    #[test]
    fn test_mock_clock_steps_on_each_read() {
        let fixed = Utc::now();
        let clock = MockClock::stepping(fixed, chrono::Duration::seconds(10));
        assert_eq!(clock.now(), fixed);
        assert_eq!(clock.now(), fixed + chrono::Duration::seconds(10));
    }
}
