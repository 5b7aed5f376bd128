//! CLI Commands

pub mod generate;
pub mod list;
pub mod send;
pub mod watch;

use anyhow::{Context, Result};
use pagecast_common::ViewerSession;
use std::path::Path;

use crate::output::print_warning;

/// Load a capture file (one relay record per line) into a fresh viewer session
pub fn load_capture(path: &Path) -> Result<ViewerSession> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read capture {}", path.display()))?;

    let mut session = ViewerSession::new();
    let report = session.log.ingest_message(&content);
    if report.skipped > 0 {
        print_warning(&format!(
            "Skipped {} malformed line(s) in {}",
            report.skipped,
            path.display()
        ));
    }
    Ok(session)
}
