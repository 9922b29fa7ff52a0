//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Check attempt fails:
//!     → retries.rs (classify: retry after fixed interval, or abort)
//! Whole wait:
//!     → timeouts.rs (optional outer deadline)
//! ```
//!
//! # Design Decisions
//! - Fixed interval between attempts, no growth
//! - No attempt cap; bounding the wait is the deadline's job
//! - Only connection-refused and not-ready failures are retried

pub mod retries;
pub mod timeouts;

pub use retries::{RetryDecision, RetryPolicy};
pub use timeouts::with_deadline;
