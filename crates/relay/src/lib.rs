//! PageCast Relay
//!
//! Accepts action records from recorders over HTTP and fans them out to every
//! connected viewer over WebSocket.

pub mod broadcaster;
pub mod config;
pub mod server;

pub use broadcaster::{BroadcastReport, Broadcaster, ConnectionId, Subscription};
pub use config::RelayConfig;
pub use server::{RelayServer, RelayState};
