//! Adapter module - remote play over a TCP socket with a JSON protocol
//!
//! Each connection plays its own game: the server starts a
//! [`Session`](crate::engine::Session) per client and shuts it down when the
//! client disconnects.
//!
//! # Protocol Overview
//!
//! Line-delimited JSON in both directions.
//!
//! ## Client → Server
//!
//! `{"seq": <u64>, "action": "<name>"}` where `<name>` is one of `moveLeft`,
//! `moveRight`, `rotate`, `hardDrop` (alias `dropDown`), `pause`, `resume`,
//! `restart` (alias `newGame`) or `getState`. Names are case-insensitive.
//!
//! ## Server → Client
//!
//! - **ack**: the command was accepted (it may still have been a no-op)
//! - **state**: full board with the active piece overlaid, counters, next piece
//! - **error**: `invalid_json` or `unknown_action`
//! - **event**: pushed `board` / `score` / `level` / `gameOver` notifications
//!
//! # Environment Variables
//!
//! - `BLOCKFALL_HOST`: Bind address (default: "127.0.0.1")
//! - `BLOCKFALL_PORT`: Port number (default: 7878)
//! - `BLOCKFALL_BOARD_WIDTH` / `BLOCKFALL_BOARD_HEIGHT`: Board size (default: 10x20)
//! - `BLOCKFALL_SEED`: Fixed piece seed for every connection (default: random)
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"seq":1,"action":"moveLeft"}
//! Server -> Client: {"type":"event","event":"board"}
//! Server -> Client: {"type":"ack","seq":1,"status":"ok"}
//! Client -> Server: {"seq":2,"action":"getState"}
//! Server -> Client: {"type":"state","seq":2,"grid":[[0,0,...],...],"score":0,"level":1,"lines":0,"paused":false,"gameOver":false,"nextShape":[...]}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"seq":1,"action":"hardDrop"}
//! ```

pub mod protocol;
pub mod server;

pub use blockfall_core as core;
pub use blockfall_engine as engine;
pub use blockfall_types as types;

pub use protocol::*;
pub use server::{run_server, ChannelObserver, ServerConfig, DEFAULT_HOST, DEFAULT_PORT};
