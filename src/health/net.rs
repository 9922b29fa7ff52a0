//! Bounded TCP connect shared by every probe.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time;

use crate::health::check::CheckError;

/// Connect with a bound on the attempt.
pub async fn connect(address: &str, timeout: Duration) -> Result<TcpStream, CheckError> {
    match time::timeout(timeout, TcpStream::connect(address)).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(CheckError::from_io(address, e)),
        Err(_) => Err(CheckError::Timeout {
            address: address.to_string(),
            timeout,
        }),
    }
}
