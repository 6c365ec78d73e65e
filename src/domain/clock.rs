//! Wall-clock port
//!
//! Rate-limit reset timestamps, counter expiry and webhook replay windows are
//! all computed against an injected clock so they can be driven in tests.

use std::fmt::Debug;

use chrono::{DateTime, Utc};

#[cfg(test)]
pub use manual::ManualClock;

/// Source of the current time
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;

    /// Current time as unix seconds
    fn unix_timestamp(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances_all_clones() {
        let clock = ManualClock::at_unix(1_700_000_000);
        let shared = clock.clone();

        shared.advance(std::time::Duration::from_secs(61));

        assert_eq!(clock.unix_timestamp(), 1_700_000_061);
    }

    #[test]
    fn test_manual_clock_set() {
        let clock = ManualClock::at_unix(0);
        let target = DateTime::from_timestamp(42, 0).unwrap();

        clock.set(target);

        assert_eq!(clock.now(), target);
    }

    #[test]
    fn test_system_clock_is_recent() {
        let clock = SystemClock::new();
        assert!(clock.unix_timestamp() > 1_600_000_000);
    }
}
