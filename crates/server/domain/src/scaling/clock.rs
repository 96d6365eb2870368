//! Injectable clock.
//!
//! All time reads in the scaling logic go through this handle so cooldown
//! behavior is deterministic under test. Production wires [`SystemClock`];
//! tests fix or advance time explicitly.

use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::sync::Mutex;

pub trait Clock: fmt::Debug + Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn starting_at(instant: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(instant),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_on_demand() {
        let clock = ManualClock::starting_at(Utc::now());
        let before = clock.now();
        clock.advance(Duration::seconds(3));
        assert_eq!(clock.now() - before, Duration::seconds(3));
    }

    #[test]
    fn fixed_clock_never_moves() {
        let instant = Utc::now();
        let clock = FixedClock::at(instant);
        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), instant);
    }
}
