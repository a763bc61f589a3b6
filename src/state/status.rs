//! Status snapshots for IPC clients and the `status` command.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::core::WindowStatus;

/// Point-in-time view of the scheduler, safe to hand to other processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// When the snapshot was taken.
    pub now: DateTime<Utc>,

    /// Zone the windows are interpreted in.
    pub timezone: String,

    /// Last commanded light state.
    pub lights_on: bool,

    pub greet_active: bool,

    /// Most recent greet deadline, even if it has already lapsed.
    pub greet_until: Option<DateTime<Utc>>,

    pub windows: Vec<WindowStatus>,
}

impl StatusSnapshot {
    /// Human-readable multi-line rendering used by `porchlight status`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "        Lights: {}", if self.lights_on { "on" } else { "off" });

        match (self.greet_active, self.greet_until) {
            (true, Some(until)) => {
                let remaining = (until - self.now).num_seconds().max(0) as u64;
                let _ = writeln!(
                    out,
                    "         Greet: active until {} (in {})",
                    until.with_timezone(&Local).format("%H:%M:%S"),
                    format_duration(remaining)
                );
            }
            _ => {
                let _ = writeln!(out, "         Greet: inactive");
            }
        }

        let _ = writeln!(out, "      Timezone: {}", self.timezone);
        if self.windows.is_empty() {
            let _ = writeln!(out, "       Windows: none");
        }
        for (i, window) in self.windows.iter().enumerate() {
            let label = if i == 0 { "Windows:" } else { "" };
            let _ = writeln!(
                out,
                "{label:>15} {} [{}]",
                window.window,
                if window.active { "active" } else { "inactive" }
            );
        }
        out
    }
}

/// Format seconds as "1h 5m", "4m 30s" or "12s".
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
