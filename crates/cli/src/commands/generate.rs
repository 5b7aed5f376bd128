//! Generate Command
//!
//! Loads a capture file into a viewer session, applies deletions and
//! selections by line number, and synthesizes a page class from the selection.

use anyhow::Result;
use clap::Args;
use pagecast_common::ViewerSession;
use std::collections::BTreeSet;
use std::path::PathBuf;

use super::load_capture;
use crate::output::{print_success, print_warning, OutputFormat};

#[derive(Args)]
pub struct GenerateArgs {
    /// Capture file written by `watch --save`
    pub capture: PathBuf,

    /// Page class name (e.g. LoginPage)
    #[arg(short, long = "class")]
    pub class_name: String,

    /// Line numbers to select, after deletions (e.g. 0,2,3)
    #[arg(short, long, value_delimiter = ',')]
    pub select: Vec<usize>,

    /// Select every line
    #[arg(long, conflicts_with = "select")]
    pub all: bool,

    /// Line numbers to delete before selecting
    #[arg(short, long, value_delimiter = ',')]
    pub delete: Vec<usize>,

    /// Write `<ClassName>.java` into this directory
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Apply deletions then selections to a loaded session
pub fn apply_selection(session: &mut ViewerSession, args: &GenerateArgs) -> Result<()> {
    let deletes: BTreeSet<usize> = args.delete.iter().copied().collect();
    if !deletes.is_empty() {
        for &i in &deletes {
            session.log.toggle(i)?;
        }
        let removed = session.log.delete_selected();
        tracing::debug!("deleted {} line(s)", removed);
    }

    let selects: BTreeSet<usize> = if args.all {
        (0..session.log.len()).collect()
    } else {
        args.select.iter().copied().collect()
    };
    for i in selects {
        session.log.toggle(i)?;
    }
    Ok(())
}

pub fn execute(args: GenerateArgs, format: OutputFormat) -> Result<()> {
    let mut session = load_capture(&args.capture)?;
    apply_selection(&mut session, &args)?;

    let Some(page) = session.generate_page_class(&args.class_name) else {
        print_warning(
            "Nothing to generate: a class name and at least one selected line are required",
        );
        return Ok(());
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(page)?),
        _ => println!("{}", page.content),
    }

    if let Some(dir) = &args.out {
        let path = page.export(dir)?;
        print_success(&format!("Wrote {}", path.display()));
    }

    Ok(())
}
