//! Relay management - running and health checking an in-process relay

use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use pagecast_relay::{RelayConfig, RelayServer};

use crate::error::{E2eError, E2eResult};
use crate::viewer::Viewer;

/// Handle to a running relay
pub struct RelayHandle {
    pub base_url: String,
    pub port: u16,
    http: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Result<(), String>>>,
}

impl RelayHandle {
    /// Start a relay on a free loopback port
    pub async fn spawn(config: RelayConfig) -> E2eResult<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        let base_url = format!("http://127.0.0.1:{}", port);

        info!("Spawning relay on port {}", port);

        let (tx, rx) = oneshot::channel::<()>();
        let server = RelayServer::new(config);
        let task = tokio::spawn(async move {
            server
                .serve_with_listener(listener, async move {
                    let _ = rx.await;
                })
                .await
                .map_err(|e| e.to_string())
        });

        let handle = RelayHandle {
            base_url,
            port,
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()?,
            shutdown: Some(tx),
            task: Some(task),
        };

        handle.wait_for_healthy(Duration::from_secs(10)).await?;
        Ok(handle)
    }

    /// Start a relay with default settings
    pub async fn spawn_default() -> E2eResult<Self> {
        Self::spawn(RelayConfig::default()).await
    }

    /// Fetch `/health`
    pub async fn health(&self) -> E2eResult<serde_json::Value> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    async fn wait_for_healthy(&self, timeout_duration: Duration) -> E2eResult<()> {
        let start = Instant::now();
        while start.elapsed() < timeout_duration {
            match self.health().await {
                Ok(_) => return Ok(()),
                Err(E2eError::Http(e)) if e.is_connect() => {}
                Err(e) => warn!("Health check error: {}", e),
            }
            sleep(Duration::from_millis(50)).await;
        }
        Err(E2eError::RelayStartup(format!(
            "no healthy response from {} within {:?}",
            self.base_url, timeout_duration
        )))
    }

    /// Live viewer count as reported by the relay
    pub async fn connections(&self) -> E2eResult<u64> {
        let health = self.health().await?;
        Ok(health["connections"].as_u64().unwrap_or(0))
    }

    /// Wait until the relay reports exactly `n` registered viewers
    pub async fn wait_for_connections(&self, n: u64) -> E2eResult<()> {
        let start = Instant::now();
        while start.elapsed() < Duration::from_secs(5) {
            if self.connections().await? == n {
                return Ok(());
            }
            sleep(Duration::from_millis(20)).await;
        }
        Err(E2eError::Timeout(format!("{} viewer connection(s)", n)))
    }

    /// Connect a viewer and wait until the relay has registered it
    pub async fn connect_viewer(&self) -> E2eResult<Viewer> {
        let before = self.connections().await?;
        let viewer = Viewer::connect(&self.ws_url()).await?;
        self.wait_for_connections(before + 1).await?;
        Ok(viewer)
    }

    /// Viewer endpoint
    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }

    /// POST a raw JSON body to `/action`
    pub async fn post_raw(&self, body: &str) -> E2eResult<reqwest::Response> {
        Ok(self
            .http
            .post(format!("{}/action", self.base_url))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await?)
    }

    /// POST one action and return the relay's echoed record
    pub async fn post_action(&self, action: &serde_json::Value) -> E2eResult<serde_json::Value> {
        let resp = self
            .http
            .post(format!("{}/action", self.base_url))
            .json(action)
            .send()
            .await?
            .error_for_status()?;
        let mut body: serde_json::Value = resp.json().await?;
        Ok(body["data"].take())
    }

    /// Stop the relay and wait for it to exit
    pub async fn stop(mut self) -> E2eResult<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => return Err(E2eError::RelayStartup(e)),
                Err(e) => return Err(E2eError::RelayStartup(e.to_string())),
            }
        }
        Ok(())
    }
}

impl Drop for RelayHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_and_stop() {
        let relay = RelayHandle::spawn_default().await.unwrap();
        assert!(relay.port > 0);
        assert_eq!(relay.connections().await.unwrap(), 0);
        relay.stop().await.unwrap();
    }
}
