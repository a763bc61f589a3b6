//! Unix signal handling.
//!
//! Signals are turned into [`SignalMessage`]s on a dedicated thread, so the
//! daemon's main loop only ever deals with a channel:
//!
//! - `SIGINT`, `SIGTERM`, `SIGHUP`: shut down
//! - `SIGUSR1`: greet, as if a camera had reported motion

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR1},
    iterator::Signals,
};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc::{self, Receiver, Sender},
};
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMessage {
    Shutdown,
    Greet,
}

/// Signal handling state shared between threads.
pub struct SignalState {
    /// Cleared once a shutdown signal arrives.
    pub running: Arc<AtomicBool>,
    pub signal_receiver: Receiver<SignalMessage>,
    /// Lets other parts of the daemon inject messages as if a signal had arrived.
    pub signal_sender: Sender<SignalMessage>,
}

pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    let running = Arc::new(AtomicBool::new(true));
    let (signal_sender, signal_receiver) = mpsc::channel();

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR1])
        .context("failed to register signal handlers")?;

    let running_clone = Arc::clone(&running);
    let sender = signal_sender.clone();

    thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            for sig in signals.forever() {
                let message = match sig {
                    SIGUSR1 => SignalMessage::Greet,
                    _ => {
                        running_clone.store(false, Ordering::SeqCst);
                        SignalMessage::Shutdown
                    }
                };

                if debug_enabled {
                    log_debug!("Received signal {sig}: {message:?}");
                }

                if sender.send(message).is_err() {
                    // Main loop is gone
                    break;
                }
            }
        })
        .context("failed to spawn signal handler thread")?;

    Ok(SignalState {
        running,
        signal_receiver,
        signal_sender,
    })
}
