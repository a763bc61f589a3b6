//! The debounced light actuator.
//!
//! `Lights` remembers what it last commanded and only fires an event when the
//! desired state differs from that. Compare-and-notify happens under one mutex,
//! so an on/off pair can never interleave.

use anyhow::Result;
use std::sync::Mutex;

use crate::constants::{EVENT_LIGHTS_OFF, EVENT_LIGHTS_ON};
use crate::notify::Notifier;

pub struct Lights {
    /// Current believed physical state.
    commanded: Mutex<bool>,
    notifier: Box<dyn Notifier>,
}

impl Lights {
    /// Create an actuator that assumes the lights are currently on.
    ///
    /// The true physical state is unknown at startup. Starting from "on" means
    /// the first `set(false)` always sends an off event, resynchronising lights
    /// that may have been left on.
    pub fn new(notifier: Box<dyn Notifier>) -> Self {
        Self {
            commanded: Mutex::new(true),
            notifier,
        }
    }

    /// Drive the lights towards `desired`.
    ///
    /// Returns `Ok(true)` if a transition happened and its event was delivered,
    /// `Ok(false)` if `desired` already matched. A delivery failure is returned
    /// as an error, but the new state is kept: there is no rollback.
    pub fn set(&self, desired: bool) -> Result<bool> {
        let mut commanded = self.commanded.lock().unwrap_or_else(|e| e.into_inner());
        if *commanded == desired {
            return Ok(false);
        }

        *commanded = desired;
        let event = if desired {
            EVENT_LIGHTS_ON
        } else {
            EVENT_LIGHTS_OFF
        };
        self.notifier.trigger(event)?;
        Ok(true)
    }

    /// Current commanded state.
    pub fn get(&self) -> bool {
        *self.commanded.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn notifier_name(&self) -> &'static str {
        self.notifier.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        pub Hook {}
        impl Notifier for Hook {
            fn trigger(&self, event: &str) -> Result<()>;
            fn name(&self) -> &'static str;
        }
    }

    #[test]
    fn test_startup_off_emits_one_off_event() {
        let mut hook = MockHook::new();
        hook.expect_trigger()
            .with(eq(EVENT_LIGHTS_OFF))
            .times(1)
            .returning(|_| Ok(()));

        let lights = Lights::new(Box::new(hook));
        assert!(lights.get());
        assert!(lights.set(false).unwrap());
        assert!(!lights.get());
    }

    #[test]
    fn test_startup_on_emits_nothing() {
        let mut hook = MockHook::new();
        hook.expect_trigger().never();

        let lights = Lights::new(Box::new(hook));
        assert!(!lights.set(true).unwrap());
        assert!(!lights.set(true).unwrap());
        assert!(lights.get());
    }

    #[test]
    fn test_repeated_sets_emit_once_per_edge() {
        let mut hook = MockHook::new();
        let mut seq = Sequence::new();
        hook.expect_trigger()
            .with(eq(EVENT_LIGHTS_OFF))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        hook.expect_trigger()
            .with(eq(EVENT_LIGHTS_ON))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        hook.expect_trigger()
            .with(eq(EVENT_LIGHTS_OFF))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let lights = Lights::new(Box::new(hook));
        for desired in [false, false, true, true, true, false, false] {
            lights.set(desired).unwrap();
        }
    }

    #[test]
    fn test_failed_delivery_keeps_new_state() {
        let mut hook = MockHook::new();
        hook.expect_trigger()
            .with(eq(EVENT_LIGHTS_OFF))
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("HTTP 503")));

        let lights = Lights::new(Box::new(hook));
        let err = lights.set(false).unwrap_err();
        assert!(err.to_string().contains("503"));

        // Belief moved on; the same desired state is now a no-op.
        assert!(!lights.get());
        assert!(!lights.set(false).unwrap());
    }

    #[test]
    fn test_notifier_name_is_exposed() {
        let mut hook = MockHook::new();
        hook.expect_name().return_const("mock");
        let lights = Lights::new(Box::new(hook));
        assert_eq!(lights.notifier_name(), "mock");
    }
}
