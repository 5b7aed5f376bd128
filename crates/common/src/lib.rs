//! PageCast Common Library
//!
//! Shared types for the recorder → relay → viewer pipeline: the action event
//! record, the locator grammar embedded in generated code, the viewer-side
//! selectable log, and the page class synthesizer.

pub mod error;
pub mod event;
pub mod locator;
pub mod log;
pub mod synth;

// Re-export commonly used types
pub use error::{Error, Result};
pub use event::{ActionEvent, ActionType, ElementType, RecordedAction};
pub use locator::{Locator, LocatorStrategy};
pub use log::{IngestReport, PageClass, SelectableLog, ViewerSession};
pub use synth::{synthesize, variable_name};

/// PageCast version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default relay listen address (the recorder extension posts here)
pub const DEFAULT_RELAY_ADDR: &str = "127.0.0.1:3003";

/// Default relay base URL for clients
pub fn default_relay_url() -> String {
    format!("http://{}", DEFAULT_RELAY_ADDR)
}

/// Current UTC time in the `YYYY-MM-DDTHH:MM:SS.mmmZ` shape browsers emit
pub fn iso_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
