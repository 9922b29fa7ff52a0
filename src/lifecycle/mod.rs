//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → interrupt the wait, non-zero exit
//! ```

pub mod signals;

pub use signals::shutdown_signal;
