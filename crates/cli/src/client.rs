//! Relay client

use anyhow::{Context, Result};
use pagecast_common::ActionEvent;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

/// Relay reply to an accepted action
#[derive(Debug, Deserialize)]
pub struct IngestResponse {
    pub message: String,
    pub data: Value,
}

pub type ViewerStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Client for talking to a PageCast relay
pub struct RelayClient {
    base_url: String,
    http: reqwest::Client,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// WebSocket endpoint derived from the base URL
    pub fn ws_url(&self) -> String {
        let rest = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            self.base_url.clone()
        };
        format!("{}/ws", rest)
    }

    /// Fetch `/health`
    pub async fn health(&self) -> Result<Value> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    /// Post one action. Failures are returned, never retried.
    pub async fn send_action(&self, event: &ActionEvent) -> Result<IngestResponse> {
        let resp = self
            .http
            .post(format!("{}/action", self.base_url))
            .json(event)
            .send()
            .await
            .with_context(|| format!("POST {}/action", self.base_url))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("relay rejected action ({}): {}", status, body);
        }
        Ok(resp.json().await?)
    }

    /// Open a viewer connection
    pub async fn subscribe(&self) -> Result<ViewerStream> {
        let url = self.ws_url();
        let (stream, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .with_context(|| format!("connect {}", url))?;
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_url() {
        let c = RelayClient::new("http://127.0.0.1:3003/").unwrap();
        assert_eq!(c.base_url(), "http://127.0.0.1:3003");
        assert_eq!(c.ws_url(), "ws://127.0.0.1:3003/ws");

        let c = RelayClient::new("https://relay.example").unwrap();
        assert_eq!(c.ws_url(), "wss://relay.example/ws");
    }
}
