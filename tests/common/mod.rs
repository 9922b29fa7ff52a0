//! Shared utilities for integration testing.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use db_ready::config::{AppConfig, DatabaseConfig, Engine, DEFAULT_DATABASE};

/// How the fake server answers one StartupMessage.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Reply {
    /// Trust auth: AuthenticationOk, ParameterStatus, BackendKeyData, ReadyForQuery.
    Accept,
    /// AuthenticationCleartextPassword.
    PasswordRequired,
    /// NoticeResponse, then the same as `Accept`.
    NoticeThenAccept,
    /// NegotiateProtocolVersion.
    Negotiate,
    /// ErrorResponse with the given SQLSTATE.
    Error(&'static str),
    /// AuthenticationOk, then ErrorResponse with the given SQLSTATE.
    TrustThenError(&'static str),
    /// A message whose length field is far above any sane bound.
    OversizedLength,
    /// A message tag no backend sends at startup.
    Garbage,
    /// Read the startup message and never answer.
    Silent,
}

/// Handle to a running fake Postgres server.
pub struct FakePostgres {
    pub addr: SocketAddr,
    connections: Arc<AtomicU32>,
}

#[allow(dead_code)]
impl FakePostgres {
    /// Number of startup messages received so far.
    pub fn connections(&self) -> u32 {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Start a fake server on an ephemeral port. Replies are consumed in order;
/// the last one repeats.
pub async fn start_fake_postgres(replies: Vec<Reply>) -> FakePostgres {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    serve(listener, replies)
}

/// Start a fake server on a fixed address.
#[allow(dead_code)]
pub async fn start_fake_postgres_on(addr: SocketAddr, replies: Vec<Reply>) -> FakePostgres {
    let listener = TcpListener::bind(addr).await.unwrap();
    serve(listener, replies)
}

fn serve(listener: TcpListener, replies: Vec<Reply>) -> FakePostgres {
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicU32::new(0));
    let replies = Arc::new(Mutex::new(VecDeque::from(replies)));

    let counter = connections.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let reply = next_reply(&replies);
                    let counter = counter.clone();
                    tokio::spawn(async move {
                        let _ = answer(socket, reply, counter).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    FakePostgres { addr, connections }
}

fn next_reply(replies: &Mutex<VecDeque<Reply>>) -> Reply {
    let mut replies = replies.lock().unwrap();
    if replies.len() > 1 {
        replies.pop_front().unwrap()
    } else {
        replies.front().cloned().unwrap_or(Reply::Accept)
    }
}

async fn answer(mut socket: TcpStream, reply: Reply, counter: Arc<AtomicU32>) -> std::io::Result<()> {
    let len = socket.read_i32().await?;
    let mut startup = vec![0u8; (len - 4) as usize];
    socket.read_exact(&mut startup).await?;
    counter.fetch_add(1, Ordering::SeqCst);

    match reply {
        Reply::Accept => write_trust_session(&mut socket).await?,
        Reply::PasswordRequired => {
            write_message(&mut socket, b'R', &3i32.to_be_bytes()).await?;
        }
        Reply::NoticeThenAccept => {
            write_message(&mut socket, b'N', b"SNOTICE\0C00000\0Mhello\0\0").await?;
            write_trust_session(&mut socket).await?;
        }
        Reply::Negotiate => {
            let mut body = Vec::new();
            body.extend_from_slice(&0i32.to_be_bytes());
            body.extend_from_slice(&0i32.to_be_bytes());
            write_message(&mut socket, b'v', &body).await?;
        }
        Reply::Error(code) => write_error(&mut socket, code).await?,
        Reply::TrustThenError(code) => {
            write_message(&mut socket, b'R', &0i32.to_be_bytes()).await?;
            write_error(&mut socket, code).await?;
        }
        Reply::OversizedLength => {
            socket.write_all(&[b'R', 0x7f, 0xff, 0xff, 0xff]).await?;
        }
        Reply::Garbage => {
            socket.write_all(&[b'D', 0, 0, 0, 6, 0, 0]).await?;
        }
        Reply::Silent => {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
    }

    socket.shutdown().await
}

async fn write_message(socket: &mut TcpStream, tag: u8, body: &[u8]) -> std::io::Result<()> {
    socket.write_u8(tag).await?;
    socket.write_i32(body.len() as i32 + 4).await?;
    socket.write_all(body).await
}

async fn write_trust_session(socket: &mut TcpStream) -> std::io::Result<()> {
    write_message(socket, b'R', &0i32.to_be_bytes()).await?;
    write_message(socket, b'S', b"server_version\016.2\0").await?;
    write_message(socket, b'K', &[0, 0, 0, 42, 0, 0, 0, 7]).await?;
    write_message(socket, b'Z', b"I").await
}

async fn write_error(socket: &mut TcpStream, code: &str) -> std::io::Result<()> {
    let mut body = Vec::new();
    for (kind, value) in [(b'S', "FATAL"), (b'C', code), (b'M', "fake server error")] {
        body.push(kind);
        body.extend_from_slice(value.as_bytes());
        body.push(0);
    }
    body.push(0);

    write_message(socket, b'E', &body).await
}

/// Config with a single `default` alias pointing at `addr`.
pub fn config_for(addr: SocketAddr, engine: Engine) -> AppConfig {
    let mut config = AppConfig::default();
    config.wait.interval_ms = 20;
    config.databases.insert(
        DEFAULT_DATABASE.to_string(),
        DatabaseConfig {
            engine,
            host: addr.ip().to_string(),
            port: addr.port(),
            connect_timeout_ms: 200,
            ..DatabaseConfig::default()
        },
    );
    config
}

/// An address with nothing listening on it.
#[allow(dead_code)]
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
