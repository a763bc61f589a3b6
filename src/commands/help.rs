//! Help and version output.

/// Show brief usage for a command (used for error messages)
pub fn show_command_usage(command: &str) {
    match command {
        "greet" | "g" => log_block_start!("Usage: porchlight greet [SECONDS]"),
        "preview" => log_block_start!("Usage: porchlight preview [YYYY-MM-DD]"),
        "status" => log_block_start!("Usage: porchlight status [--json]"),
        _ => log_block_start!("Usage: porchlight [OPTIONS] [COMMAND]"),
    }
}

pub fn display_help() {
    log_version!();
    log_block_start!("Usage: porchlight [OPTIONS] [COMMAND]");
    log_block_start!("Commands:");
    log_indented!("run                     Run the daemon (default)");
    log_indented!("status [--json]         Show the state of the running daemon");
    log_indented!("greet, g [SECONDS]      Turn the lights on for a while");
    log_indented!("preview [YYYY-MM-DD]    Show when the lights would switch on a day");
    log_indented!("help                    Show this help");
    log_block_start!("Options:");
    log_indented!("-c, --config <DIR>      Read porchlight.toml from DIR");
    log_indented!("-d, --debug             Log the reasoning behind every tick");
    log_indented!("-n, --dry-run           Log events instead of calling the webhooks service");
    log_indented!("-l, --log <FILE>        Append the log to FILE instead of the terminal");
    log_indented!("-j, --json              Machine-readable status output");
    log_indented!("-h, --help              Print help");
    log_indented!("-V, --version           Print version");
    log_block_start!("Signals:");
    log_indented!("SIGUSR1                 Greet for the configured greet_duration");
    log_indented!("SIGINT, SIGTERM, SIGHUP Shut down");
    log_end!();
}

pub fn display_version_info() {
    log_version!();
    log_end!();
}

/// Help shown after a parse error, which has already been logged.
pub fn display_help_due_to_error() {
    show_command_usage("");
    log_indented!("Run 'porchlight --help' for more information.");
    log_end!();
}
