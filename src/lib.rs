//! # Porchlight Library
//!
//! Internal library for the porchlight binary.
//!
//! This library exists to enable testing of the scheduling internals and to keep
//! CLI dispatch (main.rs) separate from application logic.
//!
//! ## Architecture
//!
//! - **Entry Point**: `Porchlight` runs the daemon with resource management
//! - **Core Logic**: `core` holds the time windows, greet override, debounced
//!   light actuator and the scheduler loop that composes them
//! - **Sun**: `geo` answers whether the sun is up at a given instant
//! - **Actuation**: `notify` fires webhook events at the automation service
//! - **Configuration**: `config` for the TOML settings
//! - **Commands**: `commands` for the `status`, `greet` and `preview` subcommands
//! - **Infrastructure**: control socket (`state::ipc`), signal handling and
//!   locking (`io`), logging

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod args;
pub mod commands;
pub mod config;
pub mod constants;
pub mod core;
pub mod geo;
pub mod io;
pub mod notify;
pub mod state;
pub mod time_source;

mod porchlight;

pub use porchlight::Porchlight;
