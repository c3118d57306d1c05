//! TCP server for the game socket
//!
//! Every connection gets its own [`Session`]. Session notifications are
//! pushed through an unbounded channel to the connection's writer task, so
//! the observer never blocks while the session lock is held.

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};

use crate::core::GameObserver;
use crate::engine::{new_game, Session};
use crate::protocol::*;
use crate::types::{BoardSize, DEFAULT_HEIGHT, DEFAULT_WIDTH};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7878;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub board: BoardSize,
    /// Fixed seed for every connection's game; entropy when unset
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            board: BoardSize::default(),
            seed: None,
        }
    }
}

fn env_value<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("invalid {}: {:?}", name, raw)),
        Err(_) => Ok(None),
    }
}

impl ServerConfig {
    /// Create from `BLOCKFALL_*` environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("BLOCKFALL_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = env_value("BLOCKFALL_PORT")?.unwrap_or(DEFAULT_PORT);

        let width = env_value("BLOCKFALL_BOARD_WIDTH")?.unwrap_or(DEFAULT_WIDTH);
        let height = env_value("BLOCKFALL_BOARD_HEIGHT")?.unwrap_or(DEFAULT_HEIGHT);
        let board = BoardSize::new(width, height).context("invalid board size")?;

        let seed = env_value("BLOCKFALL_SEED")?;

        Ok(Self {
            host,
            port,
            board,
            seed,
        })
    }
}

/// Forwards session notifications to a connection's writer
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<Response>,
    score: u32,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::UnboundedSender<Response>) -> Self {
        Self { tx, score: 0 }
    }

    fn push(&self, event: EventMessage) {
        // Receiver gone means the connection is closing
        let _ = self.tx.send(Response::Event(event));
    }
}

impl GameObserver for ChannelObserver {
    fn on_board_changed(&mut self) {
        self.push(EventMessage::board());
    }

    fn on_game_over(&mut self) {
        self.push(EventMessage::game_over(self.score));
    }

    fn on_score_changed(&mut self, score: u32) {
        self.score = score;
        self.push(EventMessage::score(score));
    }

    fn on_level_changed(&mut self, level: u32) {
        self.push(EventMessage::level(level));
    }
}

/// Start the TCP server
pub async fn run_server(
    config: ServerConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    let bound = listener.local_addr()?;
    println!(
        "[Server] Listening on {} ({}x{} board)",
        bound,
        config.board.width(),
        config.board.height()
    );
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let config = Arc::new(config);
    let mut client_id_counter = 0usize;

    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        println!("[Server] Client {} connected from {}", client_id, addr);

        let config = Arc::clone(&config);
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, config).await {
                eprintln!("[Server] Client {} error: {:#}", client_id, e);
            }
            println!("[Server] Client {} disconnected", client_id);
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: usize,
    config: Arc<ServerConfig>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);

    let (tx, mut rx) = mpsc::unbounded_channel::<Response>();

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            if serde_json::to_writer(&mut buf, &msg).is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let game = new_game(config.board, config.seed);
    let observer = ChannelObserver::new(tx.clone());
    let session = Session::start(game, Some(Box::new(observer)))?;

    let result = serve_requests(BufReader::new(reader), &session, &tx).await;

    println!(
        "[Server] Client {} session closed, score {}",
        client_id,
        session.score()
    );
    session.shutdown();
    session.set_observer(None);
    drop(session);

    drop(tx);
    let _ = write_task.await;

    result
}

async fn serve_requests<R>(
    mut reader: BufReader<R>,
    session: &Session,
    tx: &mpsc::UnboundedSender<Response>,
) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match parse_request(trimmed) {
            Ok((seq, Action::GetState)) => {
                Response::State(StateMessage::from_snapshot(seq, &session.snapshot()))
            }
            Ok((seq, Action::Command(command))) => {
                session.apply(command);
                create_ack(seq)
            }
            Err(err) => Response::Error(err),
        };

        if tx.send(response).is_err() {
            return Ok(());
        }
    }
}
