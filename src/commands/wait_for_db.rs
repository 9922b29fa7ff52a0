//! `wait_for_db`: block until the target databases accept connections.
//!
//! # Behavior
//! ```text
//! loop:
//!     check(databases)
//!       Ok              → "Database available!", return
//!       Refused/NotReady → warn, sleep(interval), retry
//!       Fatal           → return error, no further attempt
//! ```
//!
//! There is no attempt cap. An optional deadline wraps the whole loop.

use std::time::Duration;

use thiserror::Error;
use tokio::time::{self, Instant};

use crate::config::DEFAULT_DATABASE;
use crate::health::{CheckError, ConnectionCheck};
use crate::resilience::timeouts::DeadlineElapsed;
use crate::resilience::{with_deadline, RetryDecision, RetryPolicy};

/// Errors that end the wait without readiness.
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("database check failed: {0}")]
    Fatal(#[from] CheckError),

    #[error("database not ready after {0:?}")]
    TimedOut(Duration),
}

/// Outcome of a successful wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitReport {
    /// Number of check invocations, including the successful one.
    pub attempts: u32,
    pub elapsed: Duration,
}

/// The readiness prober.
pub struct WaitForDb<C> {
    checker: C,
    databases: Vec<String>,
    policy: RetryPolicy,
    deadline: Option<Duration>,
}

impl<C: ConnectionCheck> WaitForDb<C> {
    /// Prober for the `default` alias with a one second interval and no deadline.
    pub fn new(checker: C) -> Self {
        Self {
            checker,
            databases: vec![DEFAULT_DATABASE.to_string()],
            policy: RetryPolicy::default(),
            deadline: None,
        }
    }

    pub fn with_databases(mut self, databases: Vec<String>) -> Self {
        self.databases = databases;
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub async fn run(&self) -> Result<WaitReport, WaitError> {
        tracing::info!(databases = ?self.databases, "Waiting for database...");

        with_deadline(self.deadline, self.poll())
            .await
            .map_err(|DeadlineElapsed(limit)| {
                tracing::error!(timeout = ?limit, "Gave up waiting for database");
                WaitError::TimedOut(limit)
            })?
    }

    async fn poll(&self) -> Result<WaitReport, WaitError> {
        let started = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);

            let err = match self.checker.check(&self.databases).await {
                Ok(()) => {
                    let elapsed = started.elapsed();
                    tracing::info!(attempt, elapsed = ?elapsed, "Database available!");
                    return Ok(WaitReport { attempts: attempt, elapsed });
                }
                Err(err) => err,
            };

            match RetryDecision::for_error(&err) {
                RetryDecision::Retry => {
                    tracing::warn!(
                        attempt,
                        class = %err.class(),
                        error = %err,
                        "Database unavailable, waiting {:?}...",
                        self.policy.interval
                    );
                    time::sleep(self.policy.interval).await;
                }
                RetryDecision::Abort => {
                    tracing::error!(attempt, error = %err, "Database check failed");
                    return Err(WaitError::Fatal(err));
                }
            }
        }
    }
}
