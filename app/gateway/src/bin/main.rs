//! Relay gateway binary entry point.
//!
//! Resolves TOML configuration, builds the store and dispatcher, and runs
//! the axum server with graceful shutdown on ctrl-c.

use anyhow::Result;
use clap::Parser;
use relay_gateway::{GatewayConfig, serve};
use std::path::PathBuf;
use tokio::signal;
use tracing_subscriber::EnvFilter;

/// Conversation relay gateway.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Configuration file. Defaults to the platform config directory.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Override the bind port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing from RUST_LOG (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = GatewayConfig::resolve(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let handle = serve(&config).await?;
    shutdown_signal().await;
    handle.shutdown().await?;

    tracing::info!("gateway shut down");
    Ok(())
}

/// Wait for ctrl-c signal for graceful shutdown.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
    }
}
