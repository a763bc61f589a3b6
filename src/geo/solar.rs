//! Sunrise/sunset based sun oracle.

use anyhow::{Context, Result};
use chrono::{DateTime, Days, NaiveDate, Utc};
use sunrise::{Coordinates, SolarDay, SolarEvent};

use super::SunOracle;

/// Sunrise and sunset for one calendar day, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunTimes {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

impl SunTimes {
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.sunrise <= now && now < self.sunset
    }
}

pub struct SolarOracle {
    latitude: f64,
    longitude: f64,
    coordinates: Coordinates,
}

impl SolarOracle {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let coordinates = Coordinates::new(latitude, longitude)
            .with_context(|| format!("Invalid coordinates: {latitude:.4}°, {longitude:.4}°"))?;
        Ok(Self {
            latitude,
            longitude,
            coordinates,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Sunrise and sunset for `date`.
    ///
    /// Which UTC calendar date an event lands on depends on longitude, so the
    /// sunset of `date` may fall on the following UTC day.
    pub fn sun_times(&self, date: NaiveDate) -> SunTimes {
        let day = SolarDay::new(self.coordinates, date);
        SunTimes {
            sunrise: day.event_time(SolarEvent::Sunrise),
            sunset: day.event_time(SolarEvent::Sunset),
        }
    }
}

impl SunOracle for SolarOracle {
    fn up(&self, now: DateTime<Utc>) -> Result<bool> {
        let today = now.date_naive();
        let yesterday = today
            .checked_sub_days(Days::new(1))
            .context("Date out of range for solar calculation")?;
        let tomorrow = today
            .checked_add_days(Days::new(1))
            .context("Date out of range for solar calculation")?;

        // A daylight span can straddle a UTC midnight, so check the neighbours too.
        Ok([yesterday, today, tomorrow]
            .into_iter()
            .any(|date| self.sun_times(date).contains(now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stockholm() -> SolarOracle {
        SolarOracle::new(59.3293, 18.0686).unwrap()
    }

    #[test]
    fn test_invalid_coordinates_are_rejected() {
        assert!(SolarOracle::new(91.0, 0.0).is_err());
        assert!(SolarOracle::new(0.0, 181.0).is_err());
    }

    #[test]
    fn test_stockholm_midsummer_noon_and_midnight() {
        let oracle = stockholm();
        let noon = Utc.with_ymd_and_hms(2024, 6, 21, 11, 0, 0).unwrap();
        let night = Utc.with_ymd_and_hms(2024, 6, 21, 23, 0, 0).unwrap();
        assert!(oracle.up(noon).unwrap());
        assert!(!oracle.up(night).unwrap());
    }

    #[test]
    fn test_stockholm_midwinter_afternoon_is_dark() {
        let oracle = stockholm();
        // Sunset in Stockholm on the winter solstice is around 14:50 local (13:50 UTC).
        let afternoon = Utc.with_ymd_and_hms(2024, 12, 21, 16, 0, 0).unwrap();
        let midday = Utc.with_ymd_and_hms(2024, 12, 21, 11, 0, 0).unwrap();
        assert!(!oracle.up(afternoon).unwrap());
        assert!(oracle.up(midday).unwrap());
    }

    #[test]
    fn test_daylight_straddling_utc_midnight() {
        // Los Angeles: summer sunset is around 03:00 UTC on the following date.
        let oracle = SolarOracle::new(34.0522, -118.2437).unwrap();
        let evening = Utc.with_ymd_and_hms(2024, 6, 22, 2, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 6, 22, 5, 0, 0).unwrap();
        assert!(oracle.up(evening).unwrap());
        assert!(!oracle.up(late).unwrap());
    }

    #[test]
    fn test_sun_times_are_ordered() {
        let oracle = stockholm();
        let date = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let times = oracle.sun_times(date);
        assert!(times.sunrise < times.sunset);
        assert!(times.contains(times.sunrise));
        assert!(!times.contains(times.sunset));
    }

    #[test]
    fn test_fixed_sun() {
        let now = Utc::now();
        assert!(crate::geo::FixedSun(true).up(now).unwrap());
        assert!(!crate::geo::FixedSun(false).up(now).unwrap());
    }
}
