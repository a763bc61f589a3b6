//! Daemon coordinator that manages the complete lifecycle of porchlight.
//!
//! Acquires the single-instance lock, loads configuration, starts the
//! scheduler and control socket, then waits on signals until told to stop.
//!
//! - Normal startup: `Porchlight::new(debug_enabled).run()`
//! - Dry run: `Porchlight::new(debug_enabled).dry_run().run()`

use anyhow::{Context, Result};
use chrono::Local;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use crate::config::{self, Config};
use crate::core::{Lights, Scheduler, SchedulerHandle, SchedulerParams};
use crate::geo::SolarOracle;
use crate::io::lock::{LockFile, acquire_lock, lock_path};
use crate::io::signals::{SignalMessage, SignalState, setup_signal_handler};
use crate::logger::Log;
use crate::notify::create_notifier;
use crate::state::ipc::{IpcServer, socket_path};
use crate::time_source::RealTimeSource;

/// Builder for configuring and running the daemon.
pub struct Porchlight {
    debug_enabled: bool,
    dry_run: bool,
    create_lock: bool,
    show_headers: bool,
    log_file: Option<String>,
}

impl Porchlight {
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            dry_run: false,
            create_lock: true,
            show_headers: true,
            log_file: None,
        }
    }

    /// Log events instead of calling the webhooks service.
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    pub fn without_lock(mut self) -> Self {
        self.create_lock = false;
        self
    }

    pub fn without_headers(mut self) -> Self {
        self.show_headers = false;
        self
    }

    pub fn with_log_file(mut self, log_file: Option<String>) -> Self {
        self.log_file = log_file;
        self
    }

    pub fn run(self) -> Result<()> {
        // Kept alive until run() returns so the file sees the final lines.
        let _log_guard = match self.log_file.clone() {
            Some(path) => Some(
                Log::start_file_logging(path.clone())
                    .with_context(|| format!("Failed to start logging to {path}"))?,
            ),
            None => None,
        };
        Log::set_timestamps(true);

        if self.show_headers {
            log_version!();
        }

        let config = match load_config(self.dry_run) {
            Ok(config) => config,
            Err(e) => {
                log_error_exit!("Configuration failed");
                return Err(e);
            }
        };
        config.log_config();

        let lock = if self.create_lock {
            Some(acquire_lock(&lock_path())?)
        } else {
            None
        };

        let result = self.serve(&config);

        if let Some(lock) = lock
            && let Err(e) = lock.release()
        {
            log_warning!("Failed to release lock: {e:#}");
        }

        log_block_start!("Shut down");
        log_end!();
        result
    }

    fn serve(&self, config: &Config) -> Result<()> {
        let signal_state = setup_signal_handler(self.debug_enabled)?;

        let notifier = create_notifier(config, self.dry_run)?;
        let (latitude, longitude) = config.coordinates()?;
        let oracle = SolarOracle::new(latitude, longitude)?;

        log_block_start!("Starting scheduler");
        log_indented!("Notifier: {}", notifier.name());

        let scheduler = Scheduler::new(SchedulerParams {
            lights: Lights::new(notifier),
            oracle: Box::new(oracle),
            windows: config.windows()?,
            clock: config.wall_clock()?,
            time_source: Arc::new(RealTimeSource),
            interval: config.tick_interval(),
            debug_enabled: self.debug_enabled,
        });
        let (handle, scheduler_thread) = scheduler.spawn()?;

        let ipc_server = match IpcServer::start(
            socket_path(),
            handle.clone(),
            config.greet_duration(),
            Arc::clone(&signal_state.running),
            self.debug_enabled,
        ) {
            Ok(server) => Some(server),
            Err(e) => {
                log_warning!("Control socket unavailable: {e:#}");
                log_indented!("'porchlight status' and 'porchlight greet' will not work");
                None
            }
        };

        wait_for_shutdown(&signal_state, &handle, config.greet_duration());

        signal_state.running.store(false, Ordering::SeqCst);
        handle.shutdown();
        if scheduler_thread.join().is_err() {
            log_warning!("Scheduler thread panicked");
        }
        if let Some(server) = ipc_server {
            server.shutdown()?;
        }

        Ok(())
    }
}

fn load_config(dry_run: bool) -> Result<Config> {
    let config = config::load()?;
    if !dry_run {
        config::validation::validate_for_actuation(&config)?;
    }
    Ok(config)
}

/// Block on the signal channel, greeting on SIGUSR1, until a shutdown arrives.
fn wait_for_shutdown(signal_state: &SignalState, handle: &SchedulerHandle, greet_secs: u64) {
    while let Ok(message) = signal_state.signal_receiver.recv() {
        match message {
            SignalMessage::Greet => {
                let until = handle.greet(chrono::Duration::seconds(greet_secs as i64));
                log_decorated!(
                    "Greeting until {}",
                    until.with_timezone(&Local).format("%H:%M:%S")
                );
            }
            SignalMessage::Shutdown => break,
        }
    }
}
