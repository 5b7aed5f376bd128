//! Watch Command
//!
//! Connects to the relay as a viewer and prints each action as it arrives.
//! Accepted lines can be appended to a capture file for `generate`.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use futures::StreamExt;
use pagecast_common::{RecordedAction, SelectableLog};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio_tungstenite::tungstenite::Message;

use crate::client::RelayClient;
use crate::output::{print_info, print_item, print_warning, EntryDisplay, OutputFormat};

#[derive(Args)]
pub struct WatchArgs {
    /// Append every accepted record to this capture file
    #[arg(short, long)]
    pub save: Option<PathBuf>,

    /// Stop after this many records
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
    pub count: Option<u64>,
}

fn print_entry(index: usize, action: &RecordedAction, format: OutputFormat) {
    let entry = EntryDisplay::new(index, action);
    match format {
        OutputFormat::Table => {
            let label = if entry.label.is_empty() {
                String::new()
            } else {
                format!(" \"{}\"", entry.label)
            };
            println!(
                "{} {} {}{} {}",
                format!("[{}]", entry.index).dimmed(),
                entry.action.bold(),
                entry.element.cyan(),
                label,
                entry.locator
            );
        }
        _ => print_item(&entry, format),
    }
}

pub async fn execute(args: WatchArgs, client: &RelayClient, format: OutputFormat) -> Result<()> {
    let mut stream = client.subscribe().await?;
    print_info(&format!("Watching {} (ctrl-c to stop)", client.ws_url()));

    let mut capture = match &args.save {
        Some(path) => Some(
            tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await
                .with_context(|| format!("open capture {}", path.display()))?,
        ),
        None => None,
    };

    let mut log = SelectableLog::new();

    'outer: loop {
        let msg = tokio::select! {
            _ = tokio::signal::ctrl_c() => break 'outer,
            msg = stream.next() => msg,
        };

        let Some(msg) = msg else {
            print_warning("Relay closed the connection");
            break;
        };

        let text = match msg? {
            Message::Text(text) => text,
            Message::Close(_) => {
                print_warning("Relay closed the connection");
                break;
            }
            _ => continue,
        };

        let before = log.len();
        let report = log.ingest_message(&text);
        if report.skipped > 0 {
            print_warning(&format!("Skipped {} malformed line(s)", report.skipped));
        }

        for (index, action) in log.entries().iter().enumerate().skip(before) {
            print_entry(index, action, format);

            if let Some(file) = capture.as_mut() {
                file.write_all(action.raw.as_bytes()).await?;
                file.write_all(b"\n").await?;
            }

            if args.count.is_some_and(|n| index as u64 + 1 >= n) {
                break 'outer;
            }
        }
    }

    if let Some(mut file) = capture {
        file.flush().await?;
    }
    let _ = stream.close(None).await;
    Ok(())
}
