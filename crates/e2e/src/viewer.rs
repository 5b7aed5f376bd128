//! WebSocket viewer used by end-to-end tests

use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::debug;

use pagecast_common::{IngestReport, SelectableLog};

use crate::error::{E2eError, E2eResult};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One connected viewer
pub struct Viewer {
    socket: Socket,
}

impl Viewer {
    pub async fn connect(url: &str) -> E2eResult<Self> {
        let (socket, _) = tokio_tungstenite::connect_async(url).await?;
        debug!("Viewer connected to {}", url);
        Ok(Self { socket })
    }

    /// Next text frame, or an error if none arrives within `wait`
    pub async fn next_text(&mut self, wait: Duration) -> E2eResult<String> {
        loop {
            let frame = timeout(wait, self.socket.next())
                .await
                .map_err(|_| E2eError::Timeout("viewer frame".to_string()))?;

            match frame {
                None => return Err(E2eError::ViewerClosed),
                Some(msg) => match msg? {
                    Message::Text(text) => return Ok(text),
                    Message::Close(_) => return Err(E2eError::ViewerClosed),
                    Message::Ping(_) | Message::Pong(_) => continue,
                    other => return Err(E2eError::UnexpectedFrame(format!("{:?}", other))),
                },
            }
        }
    }

    /// Next record as JSON
    pub async fn next_record(&mut self, wait: Duration) -> E2eResult<serde_json::Value> {
        let text = self.next_text(wait).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Succeeds when no text frame arrives for `wait`
    pub async fn expect_silence(&mut self, wait: Duration) -> E2eResult<()> {
        match self.next_text(wait).await {
            Err(E2eError::Timeout(_)) => Ok(()),
            Ok(text) => Err(E2eError::UnexpectedFrame(text)),
            Err(e) => Err(e),
        }
    }

    /// Read one message and feed it to a viewer log
    pub async fn receive_into(
        &mut self,
        log: &mut SelectableLog,
        wait: Duration,
    ) -> E2eResult<IngestReport> {
        let text = self.next_text(wait).await?;
        Ok(log.ingest_message(&text))
    }

    /// Close the socket from the viewer side
    pub async fn close(mut self) -> E2eResult<()> {
        self.socket.close(None).await?;
        // Drain until the relay acknowledges.
        while let Some(Ok(_)) = self.socket.next().await {}
        Ok(())
    }

    /// Drop the TCP connection without a close handshake
    pub fn abandon(self) {
        drop(self.socket);
    }

    /// Send an arbitrary text frame, which the relay ignores
    pub async fn send_text(&mut self, text: &str) -> E2eResult<()> {
        self.socket.send(Message::Text(text.to_string())).await?;
        Ok(())
    }
}
