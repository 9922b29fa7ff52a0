//! Outer deadline for the wait.
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - `None` means unbounded; the wait then ends only on success, a fatal
//!   error or an interrupt

use std::future::Future;
use std::time::Duration;

use tokio::time;

/// Returned when the deadline passes before `fut` completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineElapsed(pub Duration);

/// Run `fut`, giving up after `deadline` if one is set.
pub async fn with_deadline<F, T>(deadline: Option<Duration>, fut: F) -> Result<T, DeadlineElapsed>
where
    F: Future<Output = T>,
{
    match deadline {
        Some(limit) => time::timeout(limit, fut).await.map_err(|_| DeadlineElapsed(limit)),
        None => Ok(fut.await),
    }
}
