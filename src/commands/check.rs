//! `check`: a single readiness attempt with no retries.

use crate::health::{CheckError, ConnectionCheck};

pub async fn run_check<C: ConnectionCheck>(checker: &C, databases: &[String]) -> Result<(), CheckError> {
    match checker.check(databases).await {
        Ok(()) => {
            tracing::info!(databases = ?databases, "Database available");
            Ok(())
        }
        Err(err) => {
            tracing::warn!(databases = ?databases, class = %err.class(), error = %err, "Database unavailable");
            Err(err)
        }
    }
}
