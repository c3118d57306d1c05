//! Blockfall game server (default binary).
//!
//! Serves one game per TCP connection. Configuration comes from the
//! `BLOCKFALL_*` environment variables; see [`blockfall::adapter`].

use anyhow::Result;

use blockfall::adapter::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env()?;

    tokio::select! {
        result = run_server(config, None) => result,
        _ = tokio::signal::ctrl_c() => {
            println!("[Server] Shutting down");
            Ok(())
        }
    }
}
