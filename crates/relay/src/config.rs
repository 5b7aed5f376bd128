//! Relay configuration

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Per-connection outbound queue depth
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Relay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// HTTP/WebSocket listen address
    pub listen: String,

    /// Records a stalled viewer may have queued before deliveries to it are dropped
    pub queue_capacity: usize,

    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen: pagecast_common::DEFAULT_RELAY_ADDR.to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            cors_origins: Vec::new(),
        }
    }
}

impl RelayConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Parsed listen address
    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid listen address {:?}: {}", self.listen, e))
    }
}
