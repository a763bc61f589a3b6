//! Outbound actuation: telling the outside world to switch the lights.
//!
//! The daemon never talks to the lights directly. It fires a named event at an
//! automation service, which owns the actual switching. This module defines the
//! `Notifier` seam the actuator calls through, plus the two implementations:
//!
//! - **Webhooks**: an HTTP GET per event against an IFTTT-style Maker endpoint
//! - **Log**: dry-run mode, which only records the event in the log

use anyhow::Result;

use crate::config::Config;

pub mod webhooks;

pub use webhooks::WebhooksNotifier;

/// Trait for delivering a named event to the automation service.
///
/// Implementations must surface delivery failures (including non-success
/// responses) as errors; the caller decides whether to retry. The daemon
/// does not.
pub trait Notifier: Send + Sync {
    /// Deliver one event, such as `outdoor_lights_on`.
    fn trigger(&self, event: &str) -> Result<()>;

    /// Short human-readable name for logs.
    fn name(&self) -> &'static str;
}

/// Dry-run notifier that only logs events.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn trigger(&self, event: &str) -> Result<()> {
        log_decorated!("Dry run: would trigger '{event}'");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}

/// Create the notifier selected by the configuration and command line.
pub fn create_notifier(config: &Config, dry_run: bool) -> Result<Box<dyn Notifier>> {
    if dry_run {
        return Ok(Box::new(LogNotifier));
    }

    let key = config.webhooks_key()?;
    let notifier = WebhooksNotifier::new(config.webhooks_url(), key)?;
    Ok(Box::new(notifier))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_notifier_never_fails() {
        crate::logger::Log::set_enabled(false);
        assert!(LogNotifier.trigger("outdoor_lights_on").is_ok());
        assert!(LogNotifier.trigger("outdoor_lights_off").is_ok());
        crate::logger::Log::set_enabled(true);
        assert_eq!(LogNotifier.name(), "dry-run");
    }
}
