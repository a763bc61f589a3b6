//! Unix socket server for the control protocol.

use anyhow::{Context, Result};
use nix::unistd::getuid;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use super::protocol::{IpcRequest, IpcResponse};
use crate::constants::{
    IPC_POLL_INTERVAL_MS, IPC_REQUEST_TIMEOUT_MS, MAXIMUM_GREET_DURATION, MINIMUM_GREET_DURATION,
    SOCKET_FILE_NAME,
};
use crate::core::SchedulerHandle;

pub struct IpcSocketServer {
    socket_path: PathBuf,
    listener: UnixListener,
    scheduler: SchedulerHandle,
    default_greet: u64,
}

impl IpcSocketServer {
    /// Bind the socket at `socket_path`, replacing any stale socket file.
    pub fn new(socket_path: PathBuf, scheduler: SchedulerHandle, default_greet: u64) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(&socket_path)
                .with_context(|| format!("Failed to remove existing socket: {socket_path:?}"))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {parent:?}"))?;
        }

        let listener = UnixListener::bind(&socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {socket_path:?}"))?;
        listener
            .set_nonblocking(true)
            .context("Failed to set socket to non-blocking mode")?;

        Ok(Self {
            socket_path,
            listener,
            scheduler,
            default_greet,
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Serve requests until `running` is cleared, then remove the socket file.
    pub fn run(self, running: Arc<AtomicBool>, debug_enabled: bool) -> Result<()> {
        if debug_enabled {
            log_debug!("IPC server listening on {:?}", self.socket_path);
        }

        while running.load(Ordering::SeqCst) {
            self.accept(debug_enabled);
            thread::sleep(Duration::from_millis(IPC_POLL_INTERVAL_MS));
        }

        if debug_enabled {
            log_debug!("IPC server shutting down");
        }
        self.cleanup()
    }

    fn accept(&self, debug_enabled: bool) {
        loop {
            match self.listener.accept() {
                Ok((stream, _addr)) => {
                    if let Err(e) = self.serve(stream)
                        && debug_enabled
                    {
                        log_debug!("IPC client error: {e:#}");
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    if debug_enabled {
                        log_debug!("Error accepting client connection: {e}");
                    }
                    break;
                }
            }
        }
    }

    /// Read one request line, answer it, and close the connection.
    fn serve(&self, stream: UnixStream) -> Result<()> {
        stream
            .set_nonblocking(false)
            .context("Failed to set client stream to blocking mode")?;
        stream
            .set_read_timeout(Some(Duration::from_millis(IPC_REQUEST_TIMEOUT_MS)))
            .context("Failed to set read timeout on client stream")?;

        let mut reader = BufReader::new(
            stream
                .try_clone()
                .context("Failed to clone stream for reader")?,
        );
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .context("Failed to read IPC request")?;

        let response = match serde_json::from_str::<IpcRequest>(line.trim()) {
            Ok(request) => self.handle(request),
            Err(e) => IpcResponse::error(format!("Invalid request: {e}")),
        };

        let mut json = serde_json::to_string(&response).context("Failed to serialize response")?;
        json.push('\n');
        let mut writer = stream;
        writer
            .write_all(json.as_bytes())
            .context("Failed to write IPC response")?;
        writer.flush().context("Failed to flush IPC response")?;
        Ok(())
    }

    pub fn handle(&self, request: IpcRequest) -> IpcResponse {
        match request {
            IpcRequest::Status => IpcResponse::Status(self.scheduler.status()),
            IpcRequest::Greet { seconds } => {
                let seconds = seconds.unwrap_or(self.default_greet);
                if !(MINIMUM_GREET_DURATION..=MAXIMUM_GREET_DURATION).contains(&seconds) {
                    return IpcResponse::error(format!(
                        "greet duration must be between {MINIMUM_GREET_DURATION} and {MAXIMUM_GREET_DURATION} seconds"
                    ));
                }
                let until = self
                    .scheduler
                    .greet(chrono::Duration::seconds(seconds as i64));
                log_decorated!("Greet requested for {seconds}s");
                IpcResponse::Greeted { until }
            }
        }
    }

    fn cleanup(&self) -> Result<()> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)
                .with_context(|| format!("Failed to remove socket file: {:?}", self.socket_path))?;
        }
        Ok(())
    }
}

/// Socket path: `$XDG_RUNTIME_DIR/porchlight.sock`, or `/run/user/{uid}/porchlight.sock`.
pub fn socket_path() -> PathBuf {
    runtime_dir().join(SOCKET_FILE_NAME)
}

/// The per-user runtime directory shared by the socket and the lock file.
pub fn runtime_dir() -> PathBuf {
    match std::env::var("XDG_RUNTIME_DIR") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(format!("/run/user/{}", getuid())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Lights, Scheduler, SchedulerParams, TimeWindow};
    use crate::geo::FixedSun;
    use crate::notify::LogNotifier;
    use crate::time_source::{ManualTimeSource, WallClock};
    use chrono::{NaiveTime, TimeZone, Utc};

    fn handle() -> SchedulerHandle {
        let window = TimeWindow::daily(
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        )
        .unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 19, 0, 0).unwrap();
        Scheduler::new(SchedulerParams {
            lights: Lights::new(Box::new(LogNotifier)),
            oracle: Box::new(FixedSun(false)),
            windows: vec![window],
            clock: WallClock::Zone(chrono_tz::UTC),
            time_source: Arc::new(ManualTimeSource::new(now)),
            interval: Duration::from_secs(1),
            debug_enabled: false,
        })
        .handle()
    }

    #[test]
    fn test_socket_path_name() {
        assert!(socket_path().ends_with("porchlight.sock"));
    }

    #[test]
    fn test_server_creation_and_cleanup() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("test-porchlight.sock");

        let server = IpcSocketServer::new(path.clone(), handle(), 300).unwrap();
        assert!(path.exists());
        server.cleanup().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_handle_greet_uses_default_and_validates_range() {
        let temp_dir = tempfile::tempdir().unwrap();
        let server =
            IpcSocketServer::new(temp_dir.path().join("g.sock"), handle(), 300).unwrap();

        match server.handle(IpcRequest::Greet { seconds: None }) {
            IpcResponse::Greeted { until } => {
                assert_eq!(until, Utc.with_ymd_and_hms(2024, 6, 3, 19, 5, 0).unwrap());
            }
            other => panic!("unexpected response: {other:?}"),
        }

        assert!(matches!(
            server.handle(IpcRequest::Greet { seconds: Some(1) }),
            IpcResponse::Error { .. }
        ));
        assert!(matches!(
            server.handle(IpcRequest::Greet { seconds: Some(86_400) }),
            IpcResponse::Error { .. }
        ));
    }

    #[test]
    fn test_handle_status() {
        let temp_dir = tempfile::tempdir().unwrap();
        let server =
            IpcSocketServer::new(temp_dir.path().join("s.sock"), handle(), 300).unwrap();

        match server.handle(IpcRequest::Status) {
            IpcResponse::Status(snapshot) => {
                assert_eq!(snapshot.windows.len(), 1);
                assert!(!snapshot.windows[0].active);
                assert!(!snapshot.greet_active);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }
}
