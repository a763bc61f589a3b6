//! The decision and actuation engine.
//!
//! Once per tick the [`Scheduler`] asks three independent questions:
//!
//! 1. Is any configured [`TimeWindow`] active right now?
//! 2. Is a greet override pending?
//! 3. Is the sun up?
//!
//! The lights should be on if (1) or (2) holds, unless (3) holds, in which case
//! they are off no matter what. The answer is handed to [`Lights`], which only
//! notifies the outside world when the commanded state actually changes.
//!
//! The scheduler runs on its own thread. Everything else (IPC clients, signal
//! handlers) talks to it through a cloneable [`SchedulerHandle`].

pub mod greet;
pub mod lights;
pub mod window;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc::{self, Receiver, RecvTimeoutError, Sender},
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub use greet::GreetOverride;
pub use lights::Lights;
pub use window::{TimeWindow, WindowStatus};

use crate::geo::SunOracle;
use crate::state::StatusSnapshot;
use crate::time_source::{TimeSource, WallClock};

/// Everything a scheduler needs, bundled to keep `Scheduler::new` readable.
pub struct SchedulerParams {
    pub lights: Lights,
    pub oracle: Box<dyn SunOracle>,
    pub windows: Vec<TimeWindow>,
    pub clock: WallClock,
    pub time_source: Arc<dyn TimeSource>,
    pub interval: Duration,
    pub debug_enabled: bool,
}

/// The inputs of one tick and the resulting decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub windows_on: bool,
    pub greet_on: bool,
    pub sun_up: bool,
}

impl Decision {
    pub fn lights_on(&self) -> bool {
        let mut on = self.windows_on || self.greet_on;
        // Sun up overrides everything, including a pending greet.
        if self.sun_up {
            on = false;
        }
        on
    }
}

pub struct Scheduler {
    lights: Arc<Lights>,
    oracle: Box<dyn SunOracle>,
    windows: Arc<[TimeWindow]>,
    greet: Arc<GreetOverride>,
    time_source: Arc<dyn TimeSource>,
    clock: WallClock,
    interval: Duration,
    debug_enabled: bool,
}

impl Scheduler {
    pub fn new(params: SchedulerParams) -> Self {
        Self {
            lights: Arc::new(params.lights),
            oracle: params.oracle,
            windows: params.windows.into(),
            greet: Arc::new(GreetOverride::new()),
            time_source: params.time_source,
            clock: params.clock,
            interval: params.interval,
            debug_enabled: params.debug_enabled,
        }
    }

    /// Evaluate the three signals at `now`, in order: windows, greet, sun.
    pub fn decide(&self, now: DateTime<Utc>) -> Result<Decision> {
        let wall = self.clock.wall_time(now);
        let windows_on = self.windows.iter().any(|w| w.active(wall));
        let greet_on = self.greet.active(now);
        let sun_up = self
            .oracle
            .up(now)
            .context("Failed to determine whether the sun is up")?;

        Ok(Decision {
            windows_on,
            greet_on,
            sun_up,
        })
    }

    /// Run one evaluate-then-actuate cycle.
    ///
    /// Returns whether the lights changed state.
    pub fn tick(&self) -> Result<bool> {
        let now = self.time_source.now();
        let decision = self.decide(now)?;
        let desired = decision.lights_on();

        if self.debug_enabled {
            log_debug!(
                "Tick at {}{}: windows={} greet={} sun_up={} -> {}",
                self.clock.wall_time(now).format("%Y-%m-%d %H:%M:%S"),
                if self.time_source.is_simulated() { " (simulated)" } else { "" },
                decision.windows_on,
                decision.greet_on,
                decision.sun_up,
                on_off(desired)
            );
        }

        let changed = self
            .lights
            .set(desired)
            .with_context(|| format!("Failed to turn lights {}", on_off(desired)))?;
        if changed {
            log_decorated!("Lights turned {}", on_off(desired));
        }
        Ok(changed)
    }

    pub fn lights(&self) -> &Lights {
        &self.lights
    }

    /// A handle sharing this scheduler's state, without a running loop behind it.
    ///
    /// Greets still take effect on the next `tick`; they just cannot wake anything.
    pub fn handle(&self) -> SchedulerHandle {
        let (wake, _) = mpsc::channel();
        self.make_handle(wake, Arc::new(AtomicBool::new(true)))
    }

    /// Start the control loop on a dedicated thread.
    ///
    /// The first tick runs immediately, which drives the lights from their
    /// assumed-on baseline to the first computed state.
    pub fn spawn(self) -> Result<(SchedulerHandle, JoinHandle<()>)> {
        let (wake_tx, wake_rx) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(true));
        let handle = self.make_handle(wake_tx, Arc::clone(&running));

        let thread = thread::Builder::new()
            .name("scheduler".to_string())
            .spawn(move || self.run(wake_rx, running))
            .context("Failed to spawn scheduler thread")?;

        Ok((handle, thread))
    }

    fn make_handle(&self, wake: Sender<()>, running: Arc<AtomicBool>) -> SchedulerHandle {
        SchedulerHandle {
            lights: Arc::clone(&self.lights),
            windows: Arc::clone(&self.windows),
            greet: Arc::clone(&self.greet),
            time_source: Arc::clone(&self.time_source),
            clock: self.clock,
            wake,
            running,
        }
    }

    fn run(self, wake: Receiver<()>, running: Arc<AtomicBool>) {
        while running.load(Ordering::SeqCst) {
            if let Err(e) = self.tick() {
                // A failed tick is abandoned; the next one starts from scratch.
                log_error!("{e:#}");
            }

            match wake.recv_timeout(self.interval) {
                Ok(()) | Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => thread::sleep(self.interval),
            }
            while wake.try_recv().is_ok() {}
        }

        if self.debug_enabled {
            log_debug!("Scheduler loop stopped");
        }
    }
}

/// Cloneable access to a scheduler from other threads.
#[derive(Clone)]
pub struct SchedulerHandle {
    lights: Arc<Lights>,
    windows: Arc<[TimeWindow]>,
    greet: Arc<GreetOverride>,
    time_source: Arc<dyn TimeSource>,
    clock: WallClock,
    wake: Sender<()>,
    running: Arc<AtomicBool>,
}

impl SchedulerHandle {
    /// Force the lights on for `duration` and wake the loop.
    ///
    /// Replaces any pending greet, even a longer one. Never blocks.
    pub fn greet(&self, duration: chrono::Duration) -> DateTime<Utc> {
        let deadline = self.greet.trigger(self.time_source.now(), duration);
        // Nobody listening just means no loop is running; the deadline still holds.
        let _ = self.wake.send(());
        deadline
    }

    /// Read-only snapshot of the current state.
    pub fn status(&self) -> StatusSnapshot {
        let now = self.time_source.now();
        let wall = self.clock.wall_time(now);
        StatusSnapshot {
            now,
            timezone: self.clock.name(),
            lights_on: self.lights.get(),
            greet_active: self.greet.active(now),
            greet_until: self.greet.deadline(),
            windows: self.windows.iter().map(|w| w.status(wall)).collect(),
        }
    }

    /// Ask the loop to exit after its current iteration.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        let _ = self.wake.send(());
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::FixedSun;
    use crate::notify::Notifier;
    use crate::time_source::ManualTimeSource;
    use chrono::{NaiveTime, TimeZone};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Notifier for Recorder {
        fn trigger(&self, event: &str) -> Result<()> {
            self.0.lock().unwrap().push(event.to_string());
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Failing;

    impl Notifier for Failing {
        fn trigger(&self, _event: &str) -> Result<()> {
            anyhow::bail!("HTTP 500")
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, h, m, 0).unwrap()
    }

    fn window(start: u32, stop: u32) -> TimeWindow {
        TimeWindow::daily(
            NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(stop, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn scheduler(
        notifier: Box<dyn Notifier>,
        sun_up: bool,
        clock: Arc<ManualTimeSource>,
    ) -> Scheduler {
        Scheduler::new(SchedulerParams {
            lights: Lights::new(notifier),
            oracle: Box::new(FixedSun(sun_up)),
            windows: vec![window(8, 18)],
            clock: WallClock::Zone(chrono_tz::UTC),
            time_source: clock,
            interval: Duration::from_millis(10),
            debug_enabled: false,
        })
    }

    #[test]
    fn test_decision_sun_overrides_everything() {
        let all = Decision {
            windows_on: true,
            greet_on: true,
            sun_up: true,
        };
        assert!(!all.lights_on());

        let greet_only = Decision {
            windows_on: false,
            greet_on: true,
            sun_up: false,
        };
        assert!(greet_only.lights_on());

        let nothing = Decision {
            windows_on: false,
            greet_on: false,
            sun_up: false,
        };
        assert!(!nothing.lights_on());
    }

    #[test]
    fn test_tick_drives_lights_and_debounces() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let clock = Arc::new(ManualTimeSource::new(at(9, 0)));
        let s = scheduler(Box::new(Recorder(Arc::clone(&events))), false, Arc::clone(&clock));

        // Baseline is on and the window is active: nothing to send.
        assert!(!s.tick().unwrap());
        clock.set(at(19, 0));
        assert!(s.tick().unwrap());
        assert!(!s.tick().unwrap());

        assert_eq!(*events.lock().unwrap(), vec!["outdoor_lights_off"]);
    }

    #[test]
    fn test_greet_via_handle_takes_effect_next_tick() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let clock = Arc::new(ManualTimeSource::new(at(19, 0)));
        let s = scheduler(Box::new(Recorder(Arc::clone(&events))), false, Arc::clone(&clock));
        let handle = s.handle();

        s.tick().unwrap();
        assert!(!handle.status().lights_on);

        let until = handle.greet(chrono::Duration::minutes(5));
        assert_eq!(until, at(19, 5));
        s.tick().unwrap();
        assert!(handle.status().lights_on);
        assert!(handle.status().greet_active);

        clock.set(at(19, 5));
        s.tick().unwrap();
        let status = handle.status();
        assert!(!status.lights_on);
        assert!(!status.greet_active);
        assert_eq!(status.greet_until, Some(at(19, 5)));

        assert_eq!(
            *events.lock().unwrap(),
            vec!["outdoor_lights_off", "outdoor_lights_on", "outdoor_lights_off"]
        );
    }

    #[test]
    fn test_failed_delivery_surfaces_from_tick() {
        let clock = Arc::new(ManualTimeSource::new(at(19, 0)));
        let s = scheduler(Box::new(Failing), false, clock);
        let err = s.tick().unwrap_err();
        assert!(format!("{err:#}").contains("HTTP 500"));
        // No rollback: the belief moved to off anyway.
        assert!(!s.lights().get());
    }

    #[test]
    fn test_status_reports_windows() {
        let clock = Arc::new(ManualTimeSource::new(at(9, 0)));
        let s = scheduler(Box::new(Recorder::default()), true, clock);
        let status = s.handle().status();
        assert_eq!(status.windows.len(), 1);
        assert_eq!(status.windows[0].window, "08:00:00-18:00:00");
        assert!(status.windows[0].active);
        assert_eq!(status.timezone, "UTC");
    }
}
