//! Command-line argument parsing and processing.
//!
//! Global flags may appear anywhere on the command line; the first positional
//! argument selects the command and the rest are its arguments.

use chrono::NaiveDate;

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the daemon
    Run {
        debug_enabled: bool,
        dry_run: bool,
        config_dir: Option<String>,
        log_file: Option<String>,
    },
    /// Query a running daemon
    StatusCommand { json: bool },
    /// Turn the lights on for a while on a running daemon
    GreetCommand { seconds: Option<u64> },
    /// Dry-run one day of scheduling
    PreviewCommand {
        debug_enabled: bool,
        config_dir: Option<String>,
        date: Option<NaiveDate>,
    },

    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to invalid arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments, including the program name in position 0.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ParsedArgs {
            action: parse_action(args),
        }
    }
}

fn parse_action<I, S>(args: I) -> CliAction
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut debug_enabled = false;
    let mut dry_run = false;
    let mut json = false;
    let mut display_help = false;
    let mut display_version = false;
    let mut config_dir: Option<String> = None;
    let mut log_file: Option<String> = None;
    let mut positional: Vec<String> = Vec::new();

    let mut iter = args.into_iter().skip(1).map(|s| s.as_ref().to_string());
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--debug" | "-d" => debug_enabled = true,
            "--dry-run" | "-n" => dry_run = true,
            "--json" | "-j" => json = true,
            "--help" | "-h" => display_help = true,
            "--version" | "-V" | "-v" => display_version = true,
            "--config" | "-c" => match iter.next() {
                Some(dir) => config_dir = Some(dir),
                None => {
                    log_warning_standalone!("--config requires a directory argument");
                    return CliAction::ShowHelpDueToError;
                }
            },
            "--log" | "-l" => match iter.next() {
                Some(file) => log_file = Some(file),
                None => {
                    log_warning_standalone!("--log requires a file argument");
                    return CliAction::ShowHelpDueToError;
                }
            },
            flag if flag.starts_with('-') && flag.parse::<i64>().is_err() => {
                log_warning_standalone!("Unknown option: {flag}");
                return CliAction::ShowHelpDueToError;
            }
            _ => positional.push(arg),
        }
    }

    // Help and version take precedence over everything else
    if display_version {
        return CliAction::ShowVersion;
    }
    if display_help {
        return CliAction::ShowHelp;
    }

    let command = positional.first().map(String::as_str);
    let rest = positional.get(1..).unwrap_or_default();

    match (command, rest) {
        (None, _) | (Some("run"), []) => CliAction::Run {
            debug_enabled,
            dry_run,
            config_dir,
            log_file,
        },
        (Some("status"), []) => CliAction::StatusCommand { json },
        (Some("greet" | "g"), []) => CliAction::GreetCommand { seconds: None },
        (Some("greet" | "g"), [seconds]) => match seconds.parse::<u64>() {
            Ok(seconds) => CliAction::GreetCommand {
                seconds: Some(seconds),
            },
            Err(_) => {
                log_warning_standalone!(
                    "Invalid greet duration '{seconds}'. Usage: porchlight greet [SECONDS]"
                );
                CliAction::ShowHelpDueToError
            }
        },
        (Some("preview"), []) => CliAction::PreviewCommand {
            debug_enabled,
            config_dir,
            date: None,
        },
        (Some("preview"), [date]) => match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(date) => CliAction::PreviewCommand {
                debug_enabled,
                config_dir,
                date: Some(date),
            },
            Err(_) => {
                log_warning_standalone!(
                    "Invalid date '{date}'. Usage: porchlight preview [YYYY-MM-DD]"
                );
                CliAction::ShowHelpDueToError
            }
        },
        (Some("help"), _) => CliAction::ShowHelp,
        (Some(command), []) => {
            log_warning_standalone!("Unknown command: {command}");
            CliAction::ShowHelpDueToError
        }
        (Some(command), extra) => {
            log_warning_standalone!(
                "Unexpected arguments for '{command}': {}",
                extra.join(" ")
            );
            CliAction::ShowHelpDueToError
        }
    }
}
