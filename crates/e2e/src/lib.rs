//! PageCast E2E Test Framework
//!
//! Runs a real relay on a loopback port and drives it the way the browser
//! recorder and the viewer do:
//!
//! ```text
//! producer (reqwest POST /action) ──► RelayHandle ──► Viewer (WebSocket)
//!                                                        │
//!                                         SelectableLog ◄┘
//! ```

pub mod error;
pub mod server;
pub mod viewer;

pub use error::{E2eError, E2eResult};
pub use server::RelayHandle;
pub use viewer::Viewer;

/// Install a test subscriber once; honours `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
