//! Control socket for a running daemon.
//!
//! The scheduler is reachable from other processes through a Unix socket
//! speaking newline-delimited JSON (see [`protocol`]). The server runs on its
//! own thread and only ever touches the scheduler through a
//! [`SchedulerHandle`], so a slow client never delays a tick.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread::JoinHandle;

use crate::core::SchedulerHandle;

pub mod client;
pub mod protocol;
mod server;

pub use client::IpcClient;
pub use protocol::{IpcRequest, IpcResponse};
pub use server::{IpcSocketServer, runtime_dir, socket_path};

/// Background thread serving the control socket.
pub struct IpcServer {
    thread_handle: Option<JoinHandle<()>>,
}

impl IpcServer {
    /// Bind `socket_path` and start serving on a new thread.
    ///
    /// Binding happens before the thread starts, so a socket error is
    /// reported here rather than lost in the background.
    pub fn start(
        socket_path: PathBuf,
        scheduler: SchedulerHandle,
        default_greet: u64,
        running: Arc<AtomicBool>,
        debug_enabled: bool,
    ) -> Result<Self> {
        let server = IpcSocketServer::new(socket_path, scheduler, default_greet)
            .context("Failed to create IPC socket server")?;

        let thread_handle = std::thread::Builder::new()
            .name("ipc-server".to_string())
            .spawn(move || {
                if let Err(e) = server.run(running, debug_enabled) {
                    log_warning!("IPC server stopped: {e:#}");
                }
            })
            .context("Failed to spawn IPC server thread")?;

        Ok(Self {
            thread_handle: Some(thread_handle),
        })
    }

    /// Wait for the server thread to exit. The caller clears `running` first.
    pub fn shutdown(mut self) -> Result<()> {
        if let Some(handle) = self.thread_handle.take() {
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("IPC server thread panicked"))?;
        }
        Ok(())
    }
}
