//! PostgreSQL readiness probe.
//!
//! # Responsibilities
//! - Open a TCP connection to the server
//! - Send a protocol 3.0 StartupMessage
//! - Classify the backend messages that follow
//!
//! # Design Decisions
//! - Stops at the first request for credentials; none are sent
//! - After AuthenticationOk (trust auth) keeps reading until ReadyForQuery
//!   or ErrorResponse, since a missing database is only reported then
//! - `57P03` (cannot_connect_now) and `3D000` (database missing) are
//!   transient; every other ErrorResponse is fatal
//! - Connect and handshake are each bounded by `connect_timeout_ms`

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time;

use crate::config::DatabaseConfig;
use crate::health::check::CheckError;
use crate::health::net::connect;

const PROTOCOL_VERSION_3: i32 = 196_608;
const MAX_MESSAGE_LEN: i32 = 64 * 1024;
const AUTH_OK: i32 = 0;

/// SQLSTATE codes that mean "try again shortly".
const TRANSIENT_CODES: &[&str] = &["57P03", "3D000"];

/// Result of reading the server's reply to a StartupMessage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupReply {
    /// Credentials requested, protocol negotiation, or ReadyForQuery.
    Accepting,
    /// ErrorResponse with SQLSTATE and message.
    Error { code: String, message: String },
}

/// Probe for one Postgres database.
#[derive(Debug, Clone)]
pub struct PostgresProbe<'a> {
    alias: &'a str,
    config: &'a DatabaseConfig,
}

impl<'a> PostgresProbe<'a> {
    pub fn new(alias: &'a str, config: &'a DatabaseConfig) -> Self {
        Self { alias, config }
    }

    pub async fn probe(&self) -> Result<(), CheckError> {
        let address = self.config.address();
        let timeout = self.config.connect_timeout();

        let mut stream = connect(&address, timeout).await?;

        let reply = time::timeout(timeout, self.handshake(&mut stream, &address))
            .await
            .map_err(|_| CheckError::Timeout {
                address: address.clone(),
                timeout,
            })??;

        match reply {
            StartupReply::Accepting => {
                tracing::debug!(database = self.alias, address = %address, "Server accepting sessions");
                Ok(())
            }
            StartupReply::Error { code, message } if TRANSIENT_CODES.contains(&code.as_str()) => {
                Err(CheckError::NotReady {
                    database: self.alias.to_string(),
                    code,
                    message,
                })
            }
            StartupReply::Error { code, message } => Err(CheckError::Rejected {
                database: self.alias.to_string(),
                code,
                message,
            }),
        }
    }

    async fn handshake(&self, stream: &mut TcpStream, address: &str) -> Result<StartupReply, CheckError> {
        let startup = encode_startup(&self.config.user, &self.config.name);
        stream
            .write_all(&startup)
            .await
            .map_err(|e| CheckError::from_io(address, e))?;

        loop {
            let (tag, body) = read_message(stream, address).await?;
            match tag {
                b'R' => match auth_code(&body, address)? {
                    AUTH_OK => continue,
                    _ => return Ok(StartupReply::Accepting),
                },
                b'v' | b'Z' => return Ok(StartupReply::Accepting),
                b'E' => return Ok(parse_error_fields(&body)),
                // NoticeResponse, ParameterStatus, BackendKeyData
                b'N' | b'S' | b'K' => continue,
                other => {
                    return Err(CheckError::Protocol {
                        address: address.to_string(),
                        reason: format!("unexpected message tag 0x{:02x}", other),
                    })
                }
            }
        }
    }
}

fn auth_code(body: &[u8], address: &str) -> Result<i32, CheckError> {
    body.get(..4)
        .and_then(|bytes| bytes.try_into().ok())
        .map(i32::from_be_bytes)
        .ok_or_else(|| CheckError::Protocol {
            address: address.to_string(),
            reason: "authentication message without a code".to_string(),
        })
}

/// Build a StartupMessage: length, protocol version, then
/// null-terminated key/value pairs closed by an extra null.
pub fn encode_startup(user: &str, database: &str) -> Vec<u8> {
    let mut params = Vec::new();
    for (key, value) in [("user", user), ("database", database)] {
        params.extend_from_slice(key.as_bytes());
        params.push(0);
        params.extend_from_slice(value.as_bytes());
        params.push(0);
    }
    params.push(0);

    let len = (8 + params.len()) as i32;
    let mut buf = Vec::with_capacity(len as usize);
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(&PROTOCOL_VERSION_3.to_be_bytes());
    buf.extend_from_slice(&params);
    buf
}

async fn read_message(stream: &mut TcpStream, address: &str) -> Result<(u8, Vec<u8>), CheckError> {
    let tag = stream.read_u8().await.map_err(|e| CheckError::from_io(address, e))?;
    let len = stream.read_i32().await.map_err(|e| CheckError::from_io(address, e))?;

    if !(4..=MAX_MESSAGE_LEN).contains(&len) {
        return Err(CheckError::Protocol {
            address: address.to_string(),
            reason: format!("invalid message length {}", len),
        });
    }

    let mut body = vec![0u8; (len - 4) as usize];
    stream
        .read_exact(&mut body)
        .await
        .map_err(|e| CheckError::from_io(address, e))?;

    Ok((tag, body))
}

/// Extract SQLSTATE (`C`) and message (`M`) from an ErrorResponse body.
pub fn parse_error_fields(body: &[u8]) -> StartupReply {
    let mut code = String::new();
    let mut message = String::new();

    for field in body.split(|b| *b == 0) {
        let Some((&kind, value)) = field.split_first() else {
            continue;
        };
        let value = String::from_utf8_lossy(value).into_owned();
        match kind {
            b'C' => code = value,
            b'M' => message = value,
            _ => {}
        }
    }

    StartupReply::Error { code, message }
}
