//! Retry logic.
//!
//! # Responsibilities
//! - Decide whether a failed check is retryable
//! - Provide the delay before the next attempt

use std::time::Duration;

use crate::health::{CheckError, FailureClass};

/// What the wait loop does after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    Abort,
}

impl RetryDecision {
    pub fn for_error(err: &CheckError) -> Self {
        match err.class() {
            FailureClass::Refused | FailureClass::NotReady => RetryDecision::Retry,
            FailureClass::Fatal => RetryDecision::Abort,
        }
    }
}

/// Fixed-interval retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

    pub fn fixed(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(Self::DEFAULT_INTERVAL)
    }
}
