//! Plain TCP readiness probe.
//!
//! A completed connect is treated as ready. Used for engines without a
//! handshake worth speaking.

use crate::config::DatabaseConfig;
use crate::health::check::CheckError;
use crate::health::net::connect;

pub async fn probe(alias: &str, config: &DatabaseConfig) -> Result<(), CheckError> {
    let address = config.address();
    let _stream = connect(&address, config.connect_timeout()).await?;

    tracing::debug!(database = alias, address = %address, "TCP connect succeeded");
    Ok(())
}
