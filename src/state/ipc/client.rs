//! Client side of the control socket, used by the `status` and `greet` commands.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use super::protocol::{IpcRequest, IpcResponse};
use super::server::socket_path;
use crate::constants::IPC_CLIENT_TIMEOUT_MS;
use crate::state::StatusSnapshot;

pub struct IpcClient {
    stream: UnixStream,
}

impl IpcClient {
    /// Connect to the running daemon's socket.
    pub fn connect() -> Result<Self> {
        Self::connect_to(&socket_path())
    }

    pub fn connect_to(path: &Path) -> Result<Self> {
        let stream = UnixStream::connect(path).with_context(|| {
            format!("Failed to connect to porchlight IPC socket at {path:?}. Is porchlight running?")
        })?;

        let timeout = Some(Duration::from_millis(IPC_CLIENT_TIMEOUT_MS));
        stream
            .set_read_timeout(timeout)
            .context("Failed to set read timeout on IPC socket")?;
        stream
            .set_write_timeout(timeout)
            .context("Failed to set write timeout on IPC socket")?;

        Ok(Self { stream })
    }

    /// Send one request and wait for its response. Consumes the connection.
    pub fn request(self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut json = serde_json::to_string(request).context("Failed to serialize request")?;
        json.push('\n');

        let mut writer = self
            .stream
            .try_clone()
            .context("Failed to clone stream for writer")?;
        writer
            .write_all(json.as_bytes())
            .context("Failed to send IPC request")?;
        writer.flush().context("Failed to flush IPC request")?;

        let mut reader = BufReader::new(self.stream);
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .context("Failed to read IPC response")?;

        if line.trim().is_empty() {
            anyhow::bail!("Received empty response from IPC server");
        }

        serde_json::from_str(line.trim())
            .with_context(|| format!("Failed to parse IPC response: {}", line.trim()))
    }

    pub fn status(self) -> Result<StatusSnapshot> {
        match self.request(&IpcRequest::Status)? {
            IpcResponse::Status(snapshot) => Ok(snapshot),
            IpcResponse::Error { message } => anyhow::bail!("{message}"),
            other => anyhow::bail!("Unexpected response to status request: {other:?}"),
        }
    }

    pub fn greet(self, seconds: Option<u64>) -> Result<DateTime<Utc>> {
        match self.request(&IpcRequest::Greet { seconds })? {
            IpcResponse::Greeted { until } => Ok(until),
            IpcResponse::Error { message } => anyhow::bail!("{message}"),
            other => anyhow::bail!("Unexpected response to greet request: {other:?}"),
        }
    }

    /// Whether a daemon is accepting connections on the default socket.
    pub fn is_running() -> bool {
        let path = socket_path();
        path.exists() && UnixStream::connect(&path).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_to_missing_socket_fails_gracefully() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = IpcClient::connect_to(&temp_dir.path().join("nothing.sock"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("Is porchlight running?"));
    }
}
