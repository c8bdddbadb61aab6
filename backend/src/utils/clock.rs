//! Injectable time source.
//!
//! OTP and token expiry are checked against a `Clock` rather than the OS
//! clock directly so expiry behaviour is deterministically testable.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock that only moves when told to.
#[cfg(test)]
pub struct ManualClock(std::sync::Mutex<DateTime<Utc>>);

#[cfg(test)]
impl ManualClock {
    /// Starts at a fixed instant (2025-01-01T00:00:00Z).
    pub fn new() -> Self {
        let start = DateTime::from_timestamp(1_735_689_600, 0).unwrap();
        Self(std::sync::Mutex::new(start))
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.0.lock().unwrap() = instant;
    }

    pub fn advance(&self, delta: chrono::Duration) {
        *self.0.lock().unwrap() += delta;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}
