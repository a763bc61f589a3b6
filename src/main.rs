//! Main application entry point.
//!
//! Parses the command line and dispatches to the daemon runner or to one of
//! the one-shot commands. Errors are printed once here, with their context
//! chain, and turned into a non-zero exit code.

use anyhow::Result;

use porchlight::args::{CliAction, ParsedArgs};
use porchlight::commands;
use porchlight::config;
use porchlight::constants::{EXIT_FAILURE, EXIT_SUCCESS};
use porchlight::{Porchlight, log_error_standalone};

fn main() {
    let parsed = ParsedArgs::parse(std::env::args());

    let code = match dispatch(parsed.action) {
        Ok(code) => code,
        Err(e) => {
            log_error_standalone!("{e:#}");
            EXIT_FAILURE
        }
    };

    std::process::exit(code);
}

fn dispatch(action: CliAction) -> Result<i32> {
    match action {
        CliAction::Run {
            debug_enabled,
            dry_run,
            config_dir,
            log_file,
        } => {
            config::set_config_dir(config_dir)?;
            let mut runner = Porchlight::new(debug_enabled).with_log_file(log_file);
            if dry_run {
                runner = runner.dry_run();
            }
            runner.run()?;
        }
        CliAction::StatusCommand { json } => commands::status::handle_status_command(json)?,
        CliAction::GreetCommand { seconds } => commands::greet::handle_greet_command(seconds)?,
        CliAction::PreviewCommand {
            debug_enabled,
            config_dir,
            date,
        } => {
            config::set_config_dir(config_dir)?;
            commands::preview::handle_preview_command(date, debug_enabled)?;
        }
        CliAction::ShowHelp => commands::help::display_help(),
        CliAction::ShowVersion => commands::help::display_version_info(),
        CliAction::ShowHelpDueToError => {
            commands::help::display_help_due_to_error();
            return Ok(EXIT_FAILURE);
        }
    }

    Ok(EXIT_SUCCESS)
}
