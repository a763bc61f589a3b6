//! The greet override: a transient deadline that forces the lights on.
//!
//! The deadline is written from IPC and signal threads and read by the
//! scheduler thread, so it lives in an atomic rather than behind the
//! scheduler's own state. Writes are last-caller-wins: a shorter greet issued
//! after a longer one shortens the override.

use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Sentinel meaning "never greeted".
const NO_DEADLINE: i64 = i64::MIN;

#[derive(Debug)]
pub struct GreetOverride {
    /// Deadline in milliseconds since the Unix epoch, or `NO_DEADLINE`.
    deadline_ms: AtomicI64,
}

impl Default for GreetOverride {
    fn default() -> Self {
        Self::new()
    }
}

impl GreetOverride {
    pub fn new() -> Self {
        Self {
            deadline_ms: AtomicI64::new(NO_DEADLINE),
        }
    }

    /// Force the lights on until `now + duration`, replacing any earlier deadline.
    ///
    /// Returns the new deadline.
    pub fn trigger(&self, now: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
        let deadline = now + duration;
        self.deadline_ms.store(deadline.timestamp_millis(), Ordering::SeqCst);
        deadline
    }

    /// True while a deadline has been set and `now` precedes it.
    pub fn active(&self, now: DateTime<Utc>) -> bool {
        self.deadline().is_some_and(|deadline| now < deadline)
    }

    /// The most recent deadline. It is never cleared, only outlived.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        match self.deadline_ms.load(Ordering::SeqCst) {
            NO_DEADLINE => None,
            ms => DateTime::from_timestamp_millis(ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, h, m, 0).unwrap()
    }

    #[test]
    fn test_inactive_before_first_greet() {
        let greet = GreetOverride::new();
        assert!(!greet.active(at(19, 0)));
        assert_eq!(greet.deadline(), None);
    }

    #[test]
    fn test_active_until_deadline_exclusive() {
        let greet = GreetOverride::new();
        let deadline = greet.trigger(at(19, 0), Duration::minutes(5));

        assert_eq!(deadline, at(19, 5));
        assert!(greet.active(at(19, 0)));
        assert!(greet.active(at(19, 4)));
        assert!(greet.active(at(19, 5) - Duration::seconds(1)));
        assert!(!greet.active(at(19, 5)));
        assert!(!greet.active(at(20, 0)));
    }

    #[test]
    fn test_last_write_wins_even_when_shorter() {
        let greet = GreetOverride::new();
        greet.trigger(at(19, 0), Duration::minutes(10));
        greet.trigger(at(19, 1), Duration::minutes(2));

        // The first deadline (19:10) would still be active, the second (19:03) is not.
        assert!(!greet.active(at(19, 5)));
        assert_eq!(greet.deadline(), Some(at(19, 3)));
    }

    #[test]
    fn test_lapsed_deadline_is_kept() {
        let greet = GreetOverride::new();
        greet.trigger(at(19, 0), Duration::minutes(5));
        assert!(!greet.active(at(21, 0)));
        assert_eq!(greet.deadline(), Some(at(19, 5)));
    }

    #[test]
    fn test_concurrent_triggers_leave_one_of_the_written_deadlines() {
        use std::sync::Arc;

        let greet = Arc::new(GreetOverride::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let greet = Arc::clone(&greet);
                std::thread::spawn(move || {
                    greet.trigger(at(19, 0), Duration::minutes(i + 1));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let deadline = greet.deadline().unwrap();
        assert!(deadline > at(19, 0) && deadline <= at(19, 8));
    }
}
