//! PageCast relay daemon
//!
//! Receives recorded actions on `POST /action` and forwards them to every
//! connected viewer.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pagecast_relay::{RelayConfig, RelayServer};

#[derive(Parser)]
#[command(name = "pagecast-relay")]
#[command(about = "PageCast relay - forwards recorded browser actions to viewers")]
#[command(version)]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, env = "PAGECAST_RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides the config file
    #[arg(short, long, env = "PAGECAST_RELAY_ADDR")]
    listen: Option<String>,

    /// Per-viewer queue depth, overrides the config file
    #[arg(long, env = "PAGECAST_QUEUE_CAPACITY")]
    queue_capacity: Option<usize>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Write the effective configuration to this path and exit
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    info!("PageCast relay v{}", pagecast_common::VERSION);

    let mut config = match &cli.config {
        Some(path) => RelayConfig::load(path)?,
        None => RelayConfig::default(),
    };
    if let Some(listen) = cli.listen {
        config.listen = listen;
    }
    if let Some(capacity) = cli.queue_capacity {
        config.queue_capacity = capacity;
    }

    if let Some(path) = &cli.write_config {
        config.save(path)?;
        info!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    RelayServer::new(config)
        .serve_with_listener(listener, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received shutdown signal");
        })
        .await?;

    info!("Relay shutdown complete");
    Ok(())
}
