//! Status command: ask the running daemon what it is doing.

use anyhow::{Context, Result};

use crate::state::StatusSnapshot;
use crate::state::ipc::IpcClient;

pub fn handle_status_command(json: bool) -> Result<()> {
    let client = IpcClient::connect().context("porchlight is not running")?;
    let snapshot = client
        .status()
        .context("Failed to receive status from porchlight")?;
    output_status(&snapshot, json)
}

fn output_status(snapshot: &StatusSnapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    } else {
        print!("{}", snapshot.render());
    }
    Ok(())
}
