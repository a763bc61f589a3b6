//! Greet command: force the lights on through the running daemon.
//!
//! This is what a camera's motion hook calls. The daemon still switches the
//! lights off while the sun is up.

use anyhow::{Context, Result};
use chrono::Local;

use crate::state::ipc::IpcClient;

pub fn handle_greet_command(seconds: Option<u64>) -> Result<()> {
    let client = IpcClient::connect().context("porchlight is not running")?;
    let until = client.greet(seconds).context("Greet was refused")?;
    println!(
        "Greeting until {}",
        until.with_timezone(&Local).format("%H:%M:%S")
    );
    Ok(())
}
