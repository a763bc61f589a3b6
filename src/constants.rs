//! Application-wide constants and defaults.

// # Scheduling

/// Seconds the scheduler waits between ticks unless woken by a greet.
pub const DEFAULT_TICK_INTERVAL: u64 = 1;
pub const MINIMUM_TICK_INTERVAL: u64 = 1;
pub const MAXIMUM_TICK_INTERVAL: u64 = 60;

/// Seconds a greet keeps the lights on (a camera motion alert).
pub const DEFAULT_GREET_DURATION: u64 = 300;
pub const MINIMUM_GREET_DURATION: u64 = 10;
pub const MAXIMUM_GREET_DURATION: u64 = 3600;

/// Window used when the configuration does not declare any.
pub const DEFAULT_WINDOW_START: &str = "05:00:00";
pub const DEFAULT_WINDOW_STOP: &str = "22:00:00";

// # Solar calculations

/// Latitudes beyond this are capped; polar day and night break the sunrise math.
pub const MAXIMUM_SOLAR_LATITUDE: f64 = 65.0;

// # Webhooks

pub const EVENT_LIGHTS_ON: &str = "outdoor_lights_on";
pub const EVENT_LIGHTS_OFF: &str = "outdoor_lights_off";
pub const DEFAULT_WEBHOOKS_URL: &str = "https://maker.ifttt.com";
/// Environment variable that overrides `webhooks_key` from the config file.
pub const WEBHOOKS_KEY_ENV: &str = "WEBHOOKS_KEY";
pub const WEBHOOKS_TIMEOUT_SECS: u64 = 10;

// # Files

pub const CONFIG_DIR_NAME: &str = "porchlight";
pub const CONFIG_FILE_NAME: &str = "porchlight.toml";
pub const LOCK_FILE_NAME: &str = "porchlight.lock";
pub const SOCKET_FILE_NAME: &str = "porchlight.sock";

// # IPC

/// How long a client waits for the daemon to answer.
pub const IPC_CLIENT_TIMEOUT_MS: u64 = 5000;
/// How long the server waits for a connected client to send its request.
pub const IPC_REQUEST_TIMEOUT_MS: u64 = 2000;
/// Accept loop polling period.
pub const IPC_POLL_INTERVAL_MS: u64 = 10;

// # Exit codes

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
