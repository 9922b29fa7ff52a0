//! Connection-check subsystem.
//!
//! # Data Flow
//! ```text
//! check(["default", ...])
//!     → databases.rs (resolve alias → DatabaseConfig)
//!     → postgres.rs (startup handshake) | tcp.rs (connect only)
//!       both via net.rs (bounded connect)
//!     → Ok(()) or CheckError
//!     → check.rs classifies: Refused | NotReady | Fatal
//! ```
//!
//! # Design Decisions
//! - One attempt per call; the wait loop owns retries
//! - Each attempt opens and drops its own connection
//! - Classification lives on the error, not in the caller

pub mod check;
pub mod databases;
pub mod net;
pub mod postgres;
pub mod tcp;

pub use check::{CheckError, ConnectionCheck, FailureClass};
pub use databases::DatabaseChecker;
