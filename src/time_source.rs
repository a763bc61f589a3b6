//! Time source abstraction for real and manually driven clocks.
//!
//! The scheduler never reads the system clock directly. It is handed an
//! `Arc<dyn TimeSource>` at construction, which lets the `preview` command and
//! the test suite step through a day deterministically while the daemon uses
//! the real clock.

use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::Mutex;

/// Trait for abstracting "what time is it".
pub trait TimeSource: Send + Sync {
    /// Get the current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Check if this is a manually driven time source.
    fn is_simulated(&self) -> bool {
        false
    }
}

/// Real-time implementation backed by the system clock.
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
pub struct ManualTimeSource {
    current: Mutex<DateTime<Utc>>,
}

impl ManualTimeSource {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Jump to an absolute instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = instant;
    }

    /// Move the clock forward by `step`.
    pub fn advance(&self, step: Duration) {
        let mut guard = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *guard += step;
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

/// The zone in which configured windows are interpreted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WallClock {
    /// The system's local zone.
    Local,
    /// An explicit IANA zone from the configuration.
    Zone(Tz),
}

impl WallClock {
    /// Wall-clock date and time of `instant` in this zone.
    pub fn wall_time(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            WallClock::Local => instant.with_timezone(&Local).naive_local(),
            WallClock::Zone(tz) => instant.with_timezone(tz).naive_local(),
        }
    }

    /// Resolve a wall-clock time in this zone to an instant.
    ///
    /// Ambiguous times (DST fall-back) resolve to the earlier instant; times
    /// skipped by a DST jump return `None`.
    pub fn to_instant(&self, wall: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            WallClock::Local => Local
                .from_local_datetime(&wall)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            WallClock::Zone(tz) => tz
                .from_local_datetime(&wall)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    pub fn name(&self) -> String {
        match self {
            WallClock::Local => "system local".to_string(),
            WallClock::Zone(tz) => tz.name().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn instant(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, h, m, 0).unwrap()
    }

    #[test]
    fn test_manual_time_source_only_moves_when_told() {
        let clock = ManualTimeSource::new(instant(19, 0));
        assert_eq!(clock.now(), instant(19, 0));
        assert_eq!(clock.now(), instant(19, 0));

        clock.advance(Duration::minutes(5));
        assert_eq!(clock.now(), instant(19, 5));

        clock.set(instant(8, 30));
        assert_eq!(clock.now(), instant(8, 30));
        assert!(clock.is_simulated());
    }

    #[test]
    fn test_real_time_source_is_not_simulated() {
        assert!(!RealTimeSource.is_simulated());
    }

    #[test]
    fn test_wall_clock_zone_conversion() {
        let stockholm = WallClock::Zone(chrono_tz::Europe::Stockholm);
        // CEST is UTC+2 in June
        let wall = stockholm.wall_time(instant(19, 0));
        assert_eq!(
            wall,
            NaiveDate::from_ymd_opt(2024, 6, 3)
                .unwrap()
                .and_hms_opt(21, 0, 0)
                .unwrap()
        );
        assert_eq!(stockholm.to_instant(wall), Some(instant(19, 0)));
    }

    #[test]
    fn test_wall_clock_skipped_time_has_no_instant() {
        let stockholm = WallClock::Zone(chrono_tz::Europe::Stockholm);
        // 2024-03-31 02:30 does not exist in Stockholm
        let skipped = NaiveDate::from_ymd_opt(2024, 3, 31)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        assert_eq!(stockholm.to_instant(skipped), None);
    }
}
