//! Error types for E2E testing

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Relay failed to start: {0}")]
    RelayStartup(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Viewer connection closed")]
    ViewerClosed,

    #[error("Unexpected frame: {0}")]
    UnexpectedFrame(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
