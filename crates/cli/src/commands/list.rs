//! List Command

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::load_capture;
use crate::output::{print_list, EntryDisplay, OutputFormat};

#[derive(Args)]
pub struct ListArgs {
    /// Capture file written by `watch --save`
    pub capture: PathBuf,
}

pub fn execute(args: ListArgs, format: OutputFormat) -> Result<()> {
    let session = load_capture(&args.capture)?;
    let entries: Vec<EntryDisplay> = session
        .log
        .entries()
        .iter()
        .enumerate()
        .map(|(i, action)| EntryDisplay::new(i, action))
        .collect();
    print_list(&entries, format);
    Ok(())
}
