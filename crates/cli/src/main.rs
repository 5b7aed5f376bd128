//! PageCast CLI - Main Entry Point
//!
//! Drives the recorder → relay → viewer pipeline from a terminal: emulate a
//! recorder, watch the relay like a viewer, and turn captured actions into
//! page classes.

use clap::{Parser, Subcommand};

mod client;
mod commands;
mod output;

use commands::{generate, list, send, watch};

/// PageCast CLI - recorded actions to page objects
#[derive(Parser)]
#[command(name = "pagecast")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Relay base URL
    #[arg(
        long,
        env = "PAGECAST_RELAY_URL",
        default_value_t = pagecast_common::default_relay_url(),
        global = true
    )]
    relay: String,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Post one recorded action to the relay
    Send(send::SendArgs),

    /// Connect to the relay and print actions as they arrive
    Watch(watch::WatchArgs),

    /// Print a capture file as a numbered log
    List(list::ListArgs),

    /// Generate a page class from selected lines of a capture file
    Generate(generate::GenerateArgs),

    /// Check relay status
    Status,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let client = client::RelayClient::new(&cli.relay)?;

    match cli.command {
        Commands::Send(args) => send::execute(args, &client, cli.format).await?,
        Commands::Watch(args) => watch::execute(args, &client, cli.format).await?,
        Commands::List(args) => list::execute(args, cli.format)?,
        Commands::Generate(args) => generate::execute(args, cli.format)?,
        Commands::Status => match client.health().await {
            Ok(health) => {
                let connections = health
                    .get("connections")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0);
                output::print_success(&format!(
                    "Relay is running at {} ({} viewer(s) connected)",
                    cli.relay, connections
                ));
            }
            Err(e) => {
                output::print_error(&format!("Cannot reach relay at {}: {}", cli.relay, e));
                std::process::exit(1);
            }
        },
        Commands::Version => {
            println!("PageCast CLI v{}", pagecast_common::VERSION);
            println!("Recorded browser actions to page object classes");
        }
    }

    Ok(())
}
