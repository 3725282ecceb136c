//! kiteshell server entry point.
//!
//! Loads configuration, opens the cache, registers the configured shell
//! version and serves the MCP tools on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use kiteshell_client::{FetchClient, FetchConfig, Network, ShellConfig};
use kiteshell_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod state;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(origin = %config.origin, db_path = %config.db_path.display(), "Starting kiteshell server on stdio transport");

    let cache = CacheDb::open(&config.db_path).await?;
    let network: Arc<dyn Network> = Arc::new(FetchClient::new(FetchConfig::from_app(&config))?);
    let state = Arc::new(state::AppState::new(config, cache, network));

    match ShellConfig::from_app(&state.config) {
        Ok(shell) => {
            if let Err(e) = state.registration.register(shell).await {
                tracing::warn!(error = %e, "initial registration failed, requests pass through until shell_register succeeds");
            }
        }
        Err(e) => tracing::warn!(error = %e, "invalid shell configuration"),
    }

    let handler = handler::KiteShellServer::new(state);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
