//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use pagecast_common::RecordedAction;
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

/// One log entry as shown to the user
#[derive(Debug, Serialize)]
pub struct EntryDisplay {
    pub index: usize,
    pub timestamp: String,
    pub element: String,
    pub action: String,
    pub label: String,
    pub locator: String,
}

impl EntryDisplay {
    pub fn new(index: usize, action: &RecordedAction) -> Self {
        Self {
            index,
            timestamp: action.event.timestamp.clone().unwrap_or_default(),
            element: action.event.element_type.to_string(),
            action: action.event.action_type.to_string(),
            label: action.event.label().unwrap_or_default().to_string(),
            locator: action
                .locator
                .as_ref()
                .map(|l| l.to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

impl TableDisplay for EntryDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["#", "Timestamp", "Element", "Action", "Label", "Locator"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.index.to_string(),
            self.timestamp.clone(),
            self.element.clone(),
            self.action.clone(),
            self.label.clone(),
            self.locator.clone(),
        ]
    }
}

/// Print a single item
pub fn print_item<T: Serialize + TableDisplay>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(T::headers());
            table.add_row(item.row());

            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(item).unwrap_or_default());
        }
        OutputFormat::Plain => {
            println!("{}", item.row().join("\t"));
        }
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    if items.is_empty() {
        println!("No items found.");
        return;
    }

    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(T::headers());
            for item in items {
                table.add_row(item.row());
            }

            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
        }
        OutputFormat::Plain => {
            for item in items {
                println!("{}", item.row().join("\t"));
            }
        }
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "!".yellow(), message);
}

/// Print info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "i".blue(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_display_row() {
        let action = RecordedAction::parse(
            r#"{"timestamp":"2024-05-01T10:00:00.000Z","elementType":"button","actionType":"click","elementLabel":"Go","generatedCode":"driver.findElement(By.id(\"go\")).click();"}"#,
        )
        .unwrap();
        let row = EntryDisplay::new(3, &action).row();
        assert_eq!(
            row,
            vec!["3", "2024-05-01T10:00:00.000Z", "button", "click", "Go", r#"By.id("go")"#]
        );
    }

    #[test]
    fn test_entry_display_without_locator() {
        let action =
            RecordedAction::parse(r#"{"actionType":"select","generatedCode":"?"}"#).unwrap();
        let entry = EntryDisplay::new(0, &action);
        assert_eq!(entry.locator, "-");
        assert_eq!(entry.element, "unknown");
    }
}
