//! Property-based tests for window membership and debounced actuation.

use anyhow::Result;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use porchlight::core::{Lights, TimeWindow};
use porchlight::notify::Notifier;
use proptest::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Counter(Arc<AtomicUsize>);

impl Notifier for Counter {
    fn trigger(&self, _event: &str) -> Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "counter"
    }
}

const ALL_DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn time_from_secs(secs: u32) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap()
}

/// A valid window as (start, stop) seconds of the day, start < stop.
fn window_strategy() -> impl Strategy<Value = (u32, u32)> {
    (0u32..86_399).prop_flat_map(|start| (Just(start), (start + 1)..86_400))
}

/// Any wall-clock reading across a few years, with microsecond precision.
fn reading_strategy() -> impl Strategy<Value = NaiveDateTime> {
    (0i64..1_500, 0u32..86_400, 0u32..1_000_000).prop_map(|(day, secs, micros)| {
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + chrono::Days::new(day as u64);
        date.and_time(NaiveTime::from_num_seconds_from_midnight_opt(secs, micros * 1_000).unwrap())
    })
}

fn weekday_strategy() -> impl Strategy<Value = Vec<Weekday>> {
    prop::collection::vec(prop::sample::select(ALL_DAYS.to_vec()), 1..7)
}

proptest! {
    #[test]
    fn prop_active_matches_half_open_interval(
        (start, stop) in window_strategy(),
        reading in reading_strategy(),
    ) {
        let window = TimeWindow::daily(time_from_secs(start), time_from_secs(stop)).unwrap();
        let t = reading.time();
        let expected = time_from_secs(start) <= t && t < time_from_secs(stop);
        prop_assert_eq!(window.active(reading), expected);
    }

    #[test]
    fn prop_active_ignores_the_date(
        (start, stop) in window_strategy(),
        secs in 0u32..86_400,
        day_a in 0u64..5_000,
        day_b in 0u64..5_000,
    ) {
        let window = TimeWindow::daily(time_from_secs(start), time_from_secs(stop)).unwrap();
        let base = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let a = (base + chrono::Days::new(day_a)).and_time(time_from_secs(secs));
        let b = (base + chrono::Days::new(day_b)).and_time(time_from_secs(secs));
        prop_assert_eq!(window.active(a), window.active(b));
    }

    #[test]
    fn prop_weekday_filter_only_narrows(
        (start, stop) in window_strategy(),
        reading in reading_strategy(),
        days in weekday_strategy(),
    ) {
        let daily = TimeWindow::daily(time_from_secs(start), time_from_secs(stop)).unwrap();
        let filtered =
            TimeWindow::new(time_from_secs(start), time_from_secs(stop), Some(days.clone())).unwrap();
        let expected = daily.active(reading) && days.contains(&reading.weekday());
        prop_assert_eq!(filtered.active(reading), expected);
    }

    #[test]
    fn prop_inverted_windows_are_rejected(a in 0u32..86_400, b in 0u32..86_400) {
        let (start, stop) = if a >= b { (a, b) } else { (b, a) };
        prop_assert!(TimeWindow::daily(time_from_secs(start), time_from_secs(stop)).is_err());
    }

    #[test]
    fn prop_lights_emit_one_event_per_change(desired in prop::collection::vec(any::<bool>(), 0..200)) {
        let count = Arc::new(AtomicUsize::new(0));
        let lights = Lights::new(Box::new(Counter(Arc::clone(&count))));

        let mut changes = 0;
        let mut previous = true;
        for &state in &desired {
            if state != previous {
                changes += 1;
                previous = state;
            }
            lights.set(state).unwrap();
            prop_assert_eq!(lights.get(), state);
        }

        prop_assert_eq!(count.load(Ordering::SeqCst), changes);
    }
}

#[test]
fn test_window_one_second_wide() {
    let window = TimeWindow::daily(time_from_secs(0), time_from_secs(1)).unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    assert!(window.active(date.and_time(time_from_secs(0))));
    assert!(window.active(
        date.and_time(time_from_secs(0))
            .with_nanosecond(999_999_000)
            .unwrap()
    ));
    assert!(!window.active(date.and_time(time_from_secs(1))));
}
