//! Error types for PageCast

use thiserror::Error;

/// Result type alias using PageCast Error
pub type Result<T> = std::result::Result<T, Error>;

/// PageCast error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No locator expression found in: {0}")]
    LocatorNotFound(String),

    #[error("Index {index} out of range (log has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}
