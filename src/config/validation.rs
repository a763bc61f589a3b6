//! Configuration validation.
//!
//! Everything that would otherwise fail later at runtime is rejected here, so
//! a bad configuration stops the daemon before it touches the lights.

use anyhow::{Context, Result};

use super::Config;
use crate::constants::*;

pub fn validate_config(config: &Config) -> Result<()> {
    let (lat, lon) = config.coordinates()?;

    if !(-90.0..=90.0).contains(&lat) {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {lat})");
    }
    if !(-180.0..=180.0).contains(&lon) {
        anyhow::bail!("longitude must be between -180 and 180 degrees (got {lon})");
    }

    if let Some(secs) = config.greet_duration
        && !(MINIMUM_GREET_DURATION..=MAXIMUM_GREET_DURATION).contains(&secs)
    {
        anyhow::bail!(
            "greet_duration ({secs} seconds) must be between {MINIMUM_GREET_DURATION} and {MAXIMUM_GREET_DURATION} seconds"
        );
    }

    if let Some(secs) = config.tick_interval
        && !(MINIMUM_TICK_INTERVAL..=MAXIMUM_TICK_INTERVAL).contains(&secs)
    {
        anyhow::bail!(
            "tick_interval ({secs} seconds) must be between {MINIMUM_TICK_INTERVAL} and {MAXIMUM_TICK_INTERVAL} seconds"
        );
    }

    if let Some(url) = config.webhooks_url.as_deref()
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        anyhow::bail!("webhooks_url must start with http:// or https:// (got '{url}')");
    }

    config.wall_clock()?;
    config.windows().context("window configuration is invalid")?;

    Ok(())
}

/// Checks that only matter when lights are really switched.
pub fn validate_for_actuation(config: &Config) -> Result<()> {
    config.webhooks_key()?;
    Ok(())
}
