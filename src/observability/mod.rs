//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! commands / health produce:
//!     → tracing events with structured fields
//!       (attempt, class, error, database, address)
//!     → logging.rs subscriber (stdout)
//! ```

pub mod logging;

pub use logging::init_logging;
