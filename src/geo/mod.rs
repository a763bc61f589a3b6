//! Astronomical sun-state queries.
//!
//! The scheduler only needs one capability from this module: "is the sun above
//! the horizon at this instant?". [`SunOracle`] is that seam; [`SolarOracle`]
//! answers it for a fixed location using the `sunrise` crate's ephemeris.

use anyhow::Result;
use chrono::{DateTime, Utc};

pub mod solar;

pub use solar::{SolarOracle, SunTimes};

/// Answers whether the sun is up at a given instant, for a fixed location.
///
/// Queries are pure with respect to `now`; implementations hold no state that
/// changes between calls.
pub trait SunOracle: Send {
    fn up(&self, now: DateTime<Utc>) -> Result<bool>;
}

/// An oracle whose answer never changes. Used when previewing and in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedSun(pub bool);

impl SunOracle for FixedSun {
    fn up(&self, _now: DateTime<Utc>) -> Result<bool> {
        Ok(self.0)
    }
}
