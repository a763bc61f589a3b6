//! Configuration for the porchlight daemon.
//!
//! Configuration lives in a single TOML file, by default
//! `$XDG_CONFIG_HOME/porchlight/porchlight.toml`:
//!
//! ```toml
//! latitude = 59.4995            # Geographic latitude (-90 to +90, capped at ±65)
//! longitude = 18.0852           # Geographic longitude (-180 to +180)
//! timezone = "Europe/Stockholm" # Zone the windows are read in (default: system local)
//! greet_duration = 300          # Seconds a greet keeps the lights on (10-3600)
//! tick_interval = 1             # Seconds between scheduler ticks (1-60)
//! webhooks_url = "https://maker.ifttt.com"
//! webhooks_key = "..."          # Overridden by the WEBHOOKS_KEY environment variable
//!
//! [[window]]
//! start = "05:00"
//! stop = "22:00"
//! weekdays = ["mon", "tue", "wed", "thu", "fri"]   # Optional, default every day
//! ```
//!
//! Without any `[[window]]` tables the lights are scheduled for one window,
//! 05:00 to 22:00, every day. The sun still switches them off during daylight.

pub mod loading;
pub mod validation;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use std::time::Duration;

use crate::constants::*;
use crate::core::TimeWindow;
use crate::core::window::{parse_time_of_day, parse_weekday};
use crate::time_source::WallClock;

pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};

/// One `[[window]]` table as written in the configuration file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WindowConfig {
    pub start: String,
    pub stop: String,
    #[serde(default)]
    pub weekdays: Vec<String>,
}

impl WindowConfig {
    pub fn to_window(&self) -> Result<TimeWindow> {
        let start = parse_time_of_day(&self.start)?;
        let stop = parse_time_of_day(&self.stop)?;
        let weekdays = self
            .weekdays
            .iter()
            .map(|day| parse_weekday(day))
            .collect::<Result<Vec<_>>>()?;
        TimeWindow::new(start, stop, Some(weekdays))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub greet_duration: Option<u64>,
    pub tick_interval: Option<u64>,
    pub webhooks_url: Option<String>,
    pub webhooks_key: Option<String>,
    #[serde(default, rename = "window")]
    pub windows: Vec<WindowConfig>,
}

impl Config {
    pub fn load() -> Result<Self> {
        load()
    }

    /// Latitude and longitude; both are required.
    pub fn coordinates(&self) -> Result<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Ok((lat, lon)),
            _ => anyhow::bail!("latitude and longitude are required"),
        }
    }

    /// The configured windows, or the default all-week window when none are set.
    pub fn windows(&self) -> Result<Vec<TimeWindow>> {
        if self.windows.is_empty() {
            let start = parse_time_of_day(DEFAULT_WINDOW_START)?;
            let stop = parse_time_of_day(DEFAULT_WINDOW_STOP)?;
            return Ok(vec![TimeWindow::daily(start, stop)?]);
        }

        self.windows
            .iter()
            .enumerate()
            .map(|(i, w)| {
                w.to_window()
                    .with_context(|| format!("invalid [[window]] #{}", i + 1))
            })
            .collect()
    }

    pub fn wall_clock(&self) -> Result<WallClock> {
        match self.timezone.as_deref() {
            None => Ok(WallClock::Local),
            Some(name) => {
                let tz: Tz = name
                    .parse()
                    .map_err(|_| anyhow::anyhow!("unknown timezone '{name}'"))?;
                Ok(WallClock::Zone(tz))
            }
        }
    }

    pub fn greet_duration(&self) -> u64 {
        self.greet_duration.unwrap_or(DEFAULT_GREET_DURATION)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval.unwrap_or(DEFAULT_TICK_INTERVAL))
    }

    pub fn webhooks_url(&self) -> &str {
        self.webhooks_url.as_deref().unwrap_or(DEFAULT_WEBHOOKS_URL)
    }

    pub fn webhooks_key(&self) -> Result<&str> {
        match self.webhooks_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => anyhow::bail!(
                "no webhooks key configured; set webhooks_key in the config or {WEBHOOKS_KEY_ENV} in the environment"
            ),
        }
    }

    /// Print the effective configuration as a log block.
    pub fn log_config(&self) {
        log_block_start!("Loaded configuration");

        if let (Some(lat), Some(lon)) = (self.latitude, self.longitude) {
            let lat_dir = if lat >= 0.0 { "N" } else { "S" };
            let lon_dir = if lon >= 0.0 { "E" } else { "W" };
            log_indented!(
                "Location: {:.3}°{}, {:.3}°{}",
                lat.abs(),
                lat_dir,
                lon.abs(),
                lon_dir
            );
        }

        match self.wall_clock() {
            Ok(clock) => log_indented!("Timezone: {}", clock.name()),
            Err(e) => log_indented!("Timezone: {e}"),
        }
        log_indented!("Greet duration: {}s", self.greet_duration());
        log_indented!("Tick interval: {}s", self.tick_interval().as_secs());
        log_indented!("Webhooks: {}", self.webhooks_url());

        match self.windows() {
            Ok(windows) => {
                for window in windows {
                    log_indented!("Window: {window}");
                }
            }
            Err(e) => log_indented!("Windows: {e:#}"),
        }
    }
}
