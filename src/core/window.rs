//! Recurring daily on-windows.
//!
//! A window is a `[start, stop)` interval of wall-clock time, optionally
//! restricted to a set of weekdays. Membership is decided by asking which of the
//! two boundaries recurs sooner: while inside the window `stop` is always the
//! nearer one, outside it `start` is.

use anyhow::Result;
use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

const DAY_MICROS: i64 = 86_400 * 1_000_000;

/// Tie-break subtracted before comparing, so `start` is inside and `stop` is not.
const TIE_BREAK_MICROS: i64 = 1;

/// A recurring daily on-interval with an optional weekday filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    start: NaiveTime,
    stop: NaiveTime,
    weekdays: Option<Vec<Weekday>>,
}

impl TimeWindow {
    /// Create a window active from `start` (inclusive) to `stop` (exclusive).
    ///
    /// An empty weekday list is treated the same as no filter. Windows may not
    /// cross midnight, so `start` must come strictly before `stop`.
    pub fn new(start: NaiveTime, stop: NaiveTime, weekdays: Option<Vec<Weekday>>) -> Result<Self> {
        let start = truncate_to_second(start);
        let stop = truncate_to_second(stop);
        if start >= stop {
            anyhow::bail!(
                "window start ({}) must be before stop ({}); windows cannot cross midnight",
                start.format("%H:%M:%S"),
                stop.format("%H:%M:%S")
            );
        }

        let weekdays = weekdays.filter(|days| !days.is_empty()).map(|mut days| {
            days.sort_by_key(|d| d.num_days_from_monday());
            days.dedup();
            days
        });

        Ok(Self {
            start,
            stop,
            weekdays,
        })
    }

    /// A window with no weekday restriction.
    pub fn daily(start: NaiveTime, stop: NaiveTime) -> Result<Self> {
        Self::new(start, stop, None)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn stop(&self) -> NaiveTime {
        self.stop
    }

    pub fn weekdays(&self) -> Option<&[Weekday]> {
        self.weekdays.as_deref()
    }

    /// Whether `now` (a wall-clock reading) falls inside this window.
    pub fn active(&self, now: NaiveDateTime) -> bool {
        if let Some(days) = &self.weekdays
            && !days.contains(&now.weekday())
        {
            return false;
        }

        let now = micros_of_day(now.time());
        let until_start = until_next(micros_of_day(self.start), now);
        let until_stop = until_next(micros_of_day(self.stop), now);
        until_stop < until_start
    }

    pub fn status(&self, now: NaiveDateTime) -> WindowStatus {
        WindowStatus {
            window: self.to_string(),
            active: self.active(now),
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M:%S"),
            self.stop.format("%H:%M:%S")
        )?;
        if let Some(days) = &self.weekdays {
            let names: Vec<String> = days.iter().map(|d| d.to_string()).collect();
            write!(f, " ({})", names.join(","))?;
        }
        Ok(())
    }
}

/// Active state of one window, as reported by status queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowStatus {
    pub window: String,
    pub active: bool,
}

/// Parse "HH:MM" or "HH:MM:SS".
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| anyhow::anyhow!("invalid time of day '{s}' (use HH:MM or HH:MM:SS)"))
}

/// Parse a weekday name such as "mon", "Tuesday" or "SAT".
pub fn parse_weekday(s: &str) -> Result<Weekday> {
    s.trim()
        .parse::<Weekday>()
        .map_err(|_| anyhow::anyhow!("unknown weekday '{s}'"))
}

fn truncate_to_second(t: NaiveTime) -> NaiveTime {
    t.with_nanosecond(0).unwrap_or(t)
}

fn micros_of_day(t: NaiveTime) -> i64 {
    // Leap-second nanos (>= 1e9) are clamped into the last microsecond of the second.
    let sub = i64::from(t.nanosecond().min(999_999_999)) / 1_000;
    i64::from(t.num_seconds_from_midnight()) * 1_000_000 + sub
}

/// Time until `boundary` next occurs after `now`, modulo one day.
fn until_next(boundary: i64, now: i64) -> i64 {
    (boundary - now - TIE_BREAK_MICROS).rem_euclid(DAY_MICROS)
}
