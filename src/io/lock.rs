//! Lock file management for single-instance enforcement.
//!
//! Two daemons driving the same lights would fight over them, so only one may
//! run per user. The lock file holds the owner's PID; a lock left behind by a
//! dead process is detected and removed.

use anyhow::{Context, Result};
use fs2::FileExt;
use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::constants::LOCK_FILE_NAME;
use crate::state::ipc::runtime_dir;

/// An acquired lock. The lock is held for as long as this value lives.
pub struct LockFile {
    file: File,
    path: PathBuf,
}

impl LockFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unlock and remove the lock file.
    pub fn release(self) -> Result<()> {
        FileExt::unlock(&self.file).context("Failed to unlock lock file")?;
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove lock file {:?}", self.path))?;
        }
        Ok(())
    }
}

/// `$XDG_RUNTIME_DIR/porchlight.lock`.
pub fn lock_path() -> PathBuf {
    runtime_dir().join(LOCK_FILE_NAME)
}

/// Take the exclusive lock at `path`, clearing a stale lock if necessary.
///
/// Fails if another live process holds the lock.
pub fn acquire_lock(path: &Path) -> Result<LockFile> {
    if let Some(lock) = try_lock(path)? {
        return Ok(lock);
    }

    handle_lock_conflict(path)?;

    try_lock(path)?.with_context(|| format!("Lock file {path:?} is held by another process"))
}

fn try_lock(path: &Path) -> Result<Option<LockFile>> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("Failed to open lock file {path:?}"))?;

    if file.try_lock_exclusive().is_err() {
        return Ok(None);
    }

    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    writeln!(file, "{}", std::process::id())?;
    file.flush()?;

    Ok(Some(LockFile {
        file,
        path: path.to_path_buf(),
    }))
}

/// Resolve a held lock: remove it if its owner is gone, fail otherwise.
fn handle_lock_conflict(path: &Path) -> Result<()> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        // Gone already; the owner just exited.
        Err(_) => return Ok(()),
    };

    let pid = match content.trim().lines().next().map(str::parse::<u32>) {
        Some(Ok(pid)) => pid,
        _ => {
            log_warning!("Lock file contains invalid PID, removing stale lock");
            let _ = std::fs::remove_file(path);
            return Ok(());
        }
    };

    if !is_process_running(pid) {
        log_warning!("Removing stale lock file (process {pid} no longer running)");
        let _ = std::fs::remove_file(path);
        return Ok(());
    }

    log_pipe!();
    log_error!("porchlight is already running (PID: {pid})");
    log_block_start!("Did you mean to:");
    log_indented!("• Check its state: porchlight status");
    log_indented!("• Turn the lights on for a while: porchlight greet");
    anyhow::bail!("another porchlight instance is running (PID: {pid})")
}

/// Whether a process with `pid` exists, using signal 0.
pub fn is_process_running(pid: u32) -> bool {
    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    match kill(Pid::from_raw(raw), None) {
        Ok(()) => true,
        // Exists but belongs to someone else.
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}
