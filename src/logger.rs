//! Structured logging with box-drawing output.
//!
//! Every line the daemon prints goes through this module. Output is written to
//! stdout with ANSI colours, or, when `--log <FILE>` is active, handed to a
//! writer thread that strips the colour codes before appending to the file.
//!
//! ## Logging Conventions
//!
//! - **`log_block_start!`**: begins a new conceptual block (startup phases,
//!   light transitions, shutdown). Prints an empty `┃` spacer, then `┣ message`.
//! - **`log_decorated!`**: a line belonging to the current block (`┣ message`).
//! - **`log_indented!`**: nested detail under a block (`┃   message`).
//! - **`log_pipe!`**: a lone `┃` spacer, used before `log_warning!`,
//!   `log_error!` and friends when they open a block of their own.
//! - **`log_version!`** / **`log_end!`**: the `┏ porchlight vX.Y.Z ━━╸` header
//!   and the `╹` terminator, printed once each per process.
//! - **`log_info!`, `log_warning!`, `log_error!`, `log_debug!`,
//!   `log_critical!`**: semantic `[LEVEL]` lines.
//! - **`log_error_exit!`**: the `┗[ERROR]` line that closes the log on a fatal
//!   startup error.
//!
//! In daemon mode every line carries a `[HH:MM:SS]` prefix so the output of a
//! long-running process can be correlated with the webhook provider's history.

use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);
static TIMESTAMPS_ENABLED: AtomicBool = AtomicBool::new(false);

// Set once when --log is active.
static LOG_CHANNEL: OnceLock<Sender<LogMessage>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Runtime switches for the logger.
pub struct Log;

impl Log {
    /// Enable or disable all log output.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Prefix each line with the local wall-clock time.
    pub fn set_timestamps(enabled: bool) {
        TIMESTAMPS_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Start routing output to `file_path`.
    ///
    /// The returned guard must be kept alive for as long as output should be
    /// captured; dropping it flushes the file and joins the writer thread.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(tx.clone())
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::Builder::new()
            .name("log-writer".to_string())
            .spawn(move || {
                let mut file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&file_path)?;

                loop {
                    match rx.recv() {
                        Ok(LogMessage::Formatted(text)) => file.write_all(text.as_bytes())?,
                        Ok(LogMessage::Shutdown) | Err(_) => {
                            file.flush()?;
                            break;
                        }
                    }
                }

                Ok::<(), anyhow::Error>(())
            })?;

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// Timestamp prefix for the current line, empty unless timestamps are on.
    pub fn timestamp_prefix() -> String {
        if TIMESTAMPS_ENABLED.load(Ordering::SeqCst) {
            format!("[{}] ", chrono::Local::now().format("%H:%M:%S"))
        } else {
            String::new()
        }
    }
}

/// Keeps file logging alive; flushes and joins the writer on drop.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Route formatted text to the log file or stdout.
pub fn write_output(text: &str) {
    if let Some(tx) = LOG_CHANNEL.get() {
        let _ = tx.send(LogMessage::Formatted(strip_ansi_codes(text)));
    } else {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

/// Write one line made of `marker` followed by `message`.
pub fn emit(marker: &str, message: &str) {
    if !Log::is_enabled() {
        return;
    }
    let prefix = Log::timestamp_prefix();
    write_output(&format!("{prefix}{marker}{message}\n"));
}

/// Write a spacer followed by a block-opening line.
pub fn emit_block(message: &str) {
    if !Log::is_enabled() {
        return;
    }
    let prefix = Log::timestamp_prefix();
    write_output(&format!("{prefix}┃\n{prefix}┣ {message}\n"));
}

/// The application header line.
pub fn version_header() -> String {
    format!("porchlight v{} ━━╸", env!("CARGO_PKG_VERSION"))
}

// # Logging Macros

#[doc(hidden)]
#[macro_export]
macro_rules! __log_message {
    ($fmt:literal $($arg:tt)*) => {
        format!($fmt $($arg)*)
    };
    ($expr:expr) => {
        ($expr).to_string()
    };
}

/// Log a line belonging to the current block.
#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)+) => {
        $crate::logger::emit("┣ ", &$crate::__log_message!($($arg)+))
    };
}

/// Log an indented detail line.
#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)+) => {
        $crate::logger::emit("┃   ", &$crate::__log_message!($($arg)+))
    };
}

/// Log a lone pipe for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::logger::emit("┃", "")
    };
}

/// Open a new block of related lines.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)+) => {
        $crate::logger::emit_block(&$crate::__log_message!($($arg)+))
    };
}

/// Log the application header.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::logger::emit("┏ ", &$crate::logger::version_header())
    };
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::logger::emit("╹", "")
    };
}

/// Log a warning in yellow.
#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)+) => {
        $crate::logger::emit("┣[\x1b[33mWARNING\x1b[0m] ", &$crate::__log_message!($($arg)+))
    };
}

/// Log a warning without the pipe prefix, for one-shot CLI output.
#[macro_export]
macro_rules! log_warning_standalone {
    ($($arg:tt)+) => {
        $crate::logger::emit("[\x1b[33mWARNING\x1b[0m] ", &$crate::__log_message!($($arg)+))
    };
}

/// Log an error without the pipe prefix, for one-shot CLI output.
#[macro_export]
macro_rules! log_error_standalone {
    ($($arg:tt)+) => {
        $crate::logger::emit("[\x1b[31mERROR\x1b[0m] ", &$crate::__log_message!($($arg)+))
    };
}

/// Log an error in red.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => {
        $crate::logger::emit("┣[\x1b[31mERROR\x1b[0m] ", &$crate::__log_message!($($arg)+))
    };
}

/// Log a fatal error that terminates the log.
#[macro_export]
macro_rules! log_error_exit {
    ($($arg:tt)+) => {{
        $crate::log_pipe!();
        $crate::logger::emit("┗[\x1b[31mERROR\x1b[0m] ", &$crate::__log_message!($($arg)+))
    }};
}

/// Log an informational message in green.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => {
        $crate::logger::emit("┣[\x1b[32mINFO\x1b[0m] ", &$crate::__log_message!($($arg)+))
    };
}

/// Log a debug message in green.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => {
        $crate::logger::emit("┣[\x1b[32mDEBUG\x1b[0m] ", &$crate::__log_message!($($arg)+))
    };
}

/// Log a critical message in red.
#[macro_export]
macro_rules! log_critical {
    ($($arg:tt)+) => {
        $crate::logger::emit("┣[\x1b[31mCRITICAL\x1b[0m] ", &$crate::__log_message!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi_codes() {
        let coloured = "┣[\x1b[31mERROR\x1b[0m] webhook failed";
        assert_eq!(strip_ansi_codes(coloured), "┣[ERROR] webhook failed");
    }

    #[test]
    fn test_strip_ansi_codes_keeps_plain_text() {
        assert_eq!(strip_ansi_codes("┃   05:00:00 - 22:00:00"), "┃   05:00:00 - 22:00:00");
    }

    #[test]
    fn test_version_header_mentions_package_version() {
        let header = version_header();
        assert!(header.starts_with("porchlight v"));
        assert!(header.contains(env!("CARGO_PKG_VERSION")));
    }
}
