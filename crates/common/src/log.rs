//! Viewer-side selectable log
//!
//! The viewer keeps every action the relay forwards, in arrival order, and
//! lets the user select entries by position, delete them, and turn the
//! selection into a [`PageClass`].

use crate::event::RecordedAction;
use crate::synth::synthesize;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of ingesting one relay message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub accepted: usize,
    pub skipped: usize,
}

/// Ordered log of received actions plus the set of selected positions
#[derive(Debug, Default)]
pub struct SelectableLog {
    entries: Vec<RecordedAction>,
    selected: BTreeSet<usize>,
}

impl SelectableLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one relay message. A message may hold several newline-separated
    /// records; each non-blank trimmed line is parsed on its own and appended.
    /// Lines that do not decode are skipped.
    pub fn ingest_message(&mut self, message: &str) -> IngestReport {
        let mut report = IngestReport::default();

        for line in message.split('\n').map(str::trim).filter(|l| !l.is_empty()) {
            match RecordedAction::parse(line) {
                Ok(action) => {
                    self.entries.push(action);
                    report.accepted += 1;
                }
                Err(e) => {
                    warn!("Skipping malformed line: {}", e);
                    report.skipped += 1;
                }
            }
        }

        report
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RecordedAction] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&RecordedAction> {
        self.entries.get(index)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
        }
    }

    /// Flip selection of `index`. Returns whether it is now selected.
    pub fn toggle(&mut self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        if self.selected.remove(&index) {
            Ok(false)
        } else {
            self.selected.insert(index);
            Ok(true)
        }
    }

    /// Selected positions, ascending
    pub fn selected_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.selected.iter().copied()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Selected entries in log order (not the order they were clicked)
    pub fn selected(&self) -> impl Iterator<Item = &RecordedAction> + '_ {
        self.selected.iter().filter_map(move |&i| self.entries.get(i))
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Remove one entry. Selected entries after it shift down one position and
    /// stay selected.
    pub fn remove(&mut self, index: usize) -> Result<RecordedAction> {
        self.check_index(index)?;
        let removed = self.entries.remove(index);
        self.selected = self
            .selected
            .iter()
            .filter(|&&i| i != index)
            .map(|&i| if i > index { i - 1 } else { i })
            .collect();
        Ok(removed)
    }

    /// Remove every selected entry and clear the selection. Returns how many
    /// entries were removed.
    pub fn delete_selected(&mut self) -> usize {
        let selected = std::mem::take(&mut self.selected);
        let before = self.entries.len();
        let mut index = 0;
        self.entries.retain(|_| {
            let keep = !selected.contains(&index);
            index += 1;
            keep
        });
        before - self.entries.len()
    }

    /// Empty the log and the selection
    pub fn clear(&mut self) {
        self.entries.clear();
        self.selected.clear();
    }
}

/// A generated page class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageClass {
    pub name: String,
    pub content: String,
}

impl PageClass {
    /// Exported file name; the extension names the generated language
    pub fn file_name(&self) -> String {
        format!("{}.java", self.name)
    }

    /// Write the class into `dir` as `<name>.java`, content unmodified
    pub fn export(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, self.content.as_bytes())?;
        info!("Exported {} ({} bytes)", path.display(), self.content.len());
        Ok(path)
    }
}

/// Everything one viewer owns: the log and the classes generated from it
#[derive(Debug, Default)]
pub struct ViewerSession {
    pub log: SelectableLog,
    page_classes: Vec<PageClass>,
}

impl ViewerSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_classes(&self) -> &[PageClass] {
        &self.page_classes
    }

    /// Synthesize a class from the current selection.
    ///
    /// Does nothing when the name is blank or nothing is selected. On success
    /// the class is appended and the selection cleared.
    pub fn generate_page_class(&mut self, name: &str) -> Option<&PageClass> {
        let name = name.trim();
        if name.is_empty() || self.log.selected_count() == 0 {
            debug!("Nothing to generate (name={:?}, selected={})", name, self.log.selected_count());
            return None;
        }

        let content = synthesize(name, self.log.selected());
        self.page_classes.push(PageClass {
            name: name.to_string(),
            content,
        });
        self.log.clear_selection();
        self.page_classes.last()
    }

    /// Empty the log, the selection and the generated classes
    pub fn clear_all(&mut self) {
        self.log.clear();
        self.page_classes.clear();
    }
}
