//! Preview command: run one day of scheduling against a simulated clock.
//!
//! Nothing is sent anywhere. The scheduler ticks once per simulated minute and
//! every change of the lights is printed, along with sunrise and sunset.

use anyhow::{Context, Result};
use chrono::{Days, Duration, NaiveDate, NaiveDateTime, Utc};
use std::sync::Arc;

use crate::config::Config;
use crate::core::{Lights, Scheduler, SchedulerParams};
use crate::geo::{SolarOracle, SunTimes};
use crate::logger::Log;
use crate::notify::Notifier;
use crate::time_source::{ManualTimeSource, TimeSource, WallClock};

/// Simulated time between ticks.
const PREVIEW_STEP_MINUTES: i64 = 1;

/// Swallows events; the preview reports transitions itself.
struct PreviewNotifier;

impl Notifier for PreviewNotifier {
    fn trigger(&self, _event: &str) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "preview"
    }
}

/// Outcome of a simulated day.
#[derive(Debug)]
pub struct DayPreview {
    pub date: NaiveDate,
    pub clock: WallClock,
    pub sun: SunTimes,
    /// Wall-clock time of each change, starting with the state at midnight.
    pub transitions: Vec<(NaiveDateTime, bool)>,
}

pub fn preview_day(config: &Config, date: NaiveDate, debug_enabled: bool) -> Result<DayPreview> {
    let clock = config.wall_clock()?;
    let (lat, lon) = config.coordinates()?;
    let oracle = SolarOracle::new(lat, lon)?;
    let sun = oracle.sun_times(date);

    let start = day_start(&clock, date)?;
    let next_day = date
        .checked_add_days(Days::new(1))
        .context("Date out of range")?;
    let end = day_start(&clock, next_day)?;

    let time_source = Arc::new(ManualTimeSource::new(start));
    let scheduler = Scheduler::new(SchedulerParams {
        lights: Lights::new(Box::new(PreviewNotifier)),
        oracle: Box::new(oracle),
        windows: config.windows()?,
        clock,
        time_source: Arc::clone(&time_source) as Arc<dyn TimeSource>,
        interval: std::time::Duration::from_secs(0),
        debug_enabled,
    });

    let mut transitions = Vec::new();
    let mut previous = None;
    while time_source.now() < end {
        scheduler.tick()?;
        let on = scheduler.lights().get();
        if previous != Some(on) {
            transitions.push((clock.wall_time(time_source.now()), on));
            previous = Some(on);
        }
        time_source.advance(Duration::minutes(PREVIEW_STEP_MINUTES));
    }

    Ok(DayPreview {
        date,
        clock,
        sun,
        transitions,
    })
}

pub fn handle_preview_command(date: Option<NaiveDate>, debug_enabled: bool) -> Result<()> {
    let config = Config::load()?;
    let clock = config.wall_clock()?;
    let date = date.unwrap_or_else(|| clock.wall_time(Utc::now()).date());

    // The scheduler reports every transition as it happens; keep that out of the
    // report unless the per-tick detail was asked for.
    let logging = Log::is_enabled();
    Log::set_enabled(debug_enabled && logging);
    let preview = preview_day(&config, date, debug_enabled);
    Log::set_enabled(logging);
    let preview = preview?;

    log_version!();
    log_block_start!(
        "Preview for {} ({})",
        preview.date.format("%A %Y-%m-%d"),
        preview.clock.name()
    );
    log_indented!(
        "Sunrise: {}",
        preview.clock.wall_time(preview.sun.sunrise).format("%H:%M")
    );
    log_indented!(
        " Sunset: {}",
        preview.clock.wall_time(preview.sun.sunset).format("%H:%M")
    );
    log_block_start!("Lights:");
    for (at, on) in &preview.transitions {
        log_indented!("{}  {}", at.format("%H:%M"), if *on { "on" } else { "off" });
    }
    log_end!();
    Ok(())
}

/// First instant of `date` in `clock`, skipping forward over a DST gap at midnight.
fn day_start(clock: &WallClock, date: NaiveDate) -> Result<chrono::DateTime<Utc>> {
    (0..3)
        .filter_map(|hour| date.and_hms_opt(hour, 0, 0))
        .find_map(|wall| clock.to_instant(wall))
        .with_context(|| format!("{date} has no representable start in {}", clock.name()))
}
