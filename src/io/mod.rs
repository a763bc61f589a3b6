// Process-level I/O: single-instance locking and Unix signals
pub mod lock;
pub mod signals;
