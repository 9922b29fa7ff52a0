//! Connection-check contract and failure classification.

use std::future::Future;
use std::io;
use std::time::Duration;

use thiserror::Error;

/// How the wait loop should treat a failed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Nothing is listening yet.
    Refused,
    /// Listening, but not accepting sessions yet.
    NotReady,
    /// Retrying will not help.
    Fatal,
}

impl std::fmt::Display for FailureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureClass::Refused => write!(f, "refused"),
            FailureClass::NotReady => write!(f, "not-ready"),
            FailureClass::Fatal => write!(f, "fatal"),
        }
    }
}

/// Errors a connection check can fail with.
#[derive(Debug, Error)]
pub enum CheckError {
    /// TCP connect failed in a way that means the server is not up yet.
    #[error("connection to {address} refused: {source}")]
    Refused {
        address: String,
        #[source]
        source: io::Error,
    },

    /// No answer within the per-attempt bound.
    #[error("no response from {address} within {timeout:?}")]
    Timeout { address: String, timeout: Duration },

    /// The server answered with an error that clears up on its own.
    #[error("database '{database}' not ready ({code}): {message}")]
    NotReady {
        database: String,
        code: String,
        message: String,
    },

    /// The server answered with any other error.
    #[error("database '{database}' rejected connection ({code}): {message}")]
    Rejected {
        database: String,
        code: String,
        message: String,
    },

    /// The alias is not configured.
    #[error("database alias '{0}' is not configured")]
    UnknownDatabase(String),

    /// Malformed or unexpected bytes from the server.
    #[error("protocol error from {address}: {reason}")]
    Protocol { address: String, reason: String },

    /// Any other I/O failure, including address resolution.
    #[error("I/O error talking to {address}: {source}")]
    Io {
        address: String,
        #[source]
        source: io::Error,
    },
}

impl CheckError {
    /// Map an I/O error from the connect/handshake path to its class.
    pub fn from_io(address: &str, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::UnexpectedEof => CheckError::Refused {
                address: address.to_string(),
                source,
            },
            _ => CheckError::Io {
                address: address.to_string(),
                source,
            },
        }
    }

    pub fn class(&self) -> FailureClass {
        match self {
            CheckError::Refused { .. } | CheckError::Timeout { .. } => FailureClass::Refused,
            CheckError::NotReady { .. } => FailureClass::NotReady,
            CheckError::Rejected { .. }
            | CheckError::UnknownDatabase(_)
            | CheckError::Protocol { .. }
            | CheckError::Io { .. } => FailureClass::Fatal,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.class() != FailureClass::Fatal
    }
}

/// A primitive that reports whether a set of databases accepts connections.
///
/// Implementations perform exactly one attempt per call; retrying is the
/// caller's job.
pub trait ConnectionCheck {
    fn check(&self, databases: &[String]) -> impl Future<Output = Result<(), CheckError>> + Send;
}

impl<T: ConnectionCheck + Sync> ConnectionCheck for &T {
    fn check(&self, databases: &[String]) -> impl Future<Output = Result<(), CheckError>> + Send {
        (**self).check(databases)
    }
}
