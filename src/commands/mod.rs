//! Command-line command handlers for porchlight.
//!
//! `status` and `greet` talk to a running daemon over its control socket;
//! `preview` runs the scheduler offline against a simulated clock.

pub mod greet;
pub mod help;
pub mod preview;
pub mod status;
