//! Runtime state shared with the outside world.
//!
//! The daemon keeps no persistent state. What it exposes is a point-in-time
//! [`StatusSnapshot`], served over the IPC socket in [`ipc`].

pub mod ipc;
pub mod status;

pub use status::StatusSnapshot;
