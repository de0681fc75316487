//! WebSocket probe implementation

use super::{
    bounded, default_connect_timeout_ms, default_read_timeout_ms, ExchangeStage, Probe, ProbeError,
    ProbeResponse, Protocol,
};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Text frame sent after the handshake
pub const WEBSOCKET_GREETING: &str = "Hello, WebSocket!";

fn default_message() -> String {
    WEBSOCKET_GREETING.to_string()
}

/// WebSocket probe configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSocketConfig {
    /// `ws://` URL
    pub url: String,
    /// Text frame sent after the handshake
    #[serde(default = "default_message")]
    pub message: String,
    /// Handshake timeout in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Time to wait for the first data frame, in milliseconds
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

impl WebSocketConfig {
    /// Create a new WebSocket configuration
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            message: default_message(),
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }

    /// Set the message
    #[must_use]
    pub fn message(mut self, message: &str) -> Self {
        self.message = message.to_string();
        self
    }

    /// Set timeouts
    #[must_use]
    pub fn timeouts(mut self, connect_ms: u64, read_ms: u64) -> Self {
        self.connect_timeout_ms = connect_ms;
        self.read_timeout_ms = read_ms;
        self
    }
}

/// WebSocket probe
pub struct WebSocketProbe {
    config: WebSocketConfig,
}

impl WebSocketProbe {
    /// Create a new WebSocket probe
    pub fn new(config: WebSocketConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Probe for WebSocketProbe {
    async fn exchange(&mut self) -> Result<ProbeResponse, ProbeError> {
        let url = self.config.url.as_str();

        let (mut socket, _) = bounded(ExchangeStage::Connect, self.config.connect_timeout_ms, async {
            connect_async(url)
                .await
                .map_err(|e| ProbeError::Connect(e.to_string()))
        })
        .await?;
        tracing::debug!(%url, "websocket handshake complete");

        socket
            .send(Message::Text(self.config.message.clone()))
            .await
            .map_err(|e| ProbeError::Write(e.to_string()))?;

        let payload = bounded(ExchangeStage::Read, self.config.read_timeout_ms, async {
            while let Some(frame) = socket.next().await {
                match frame.map_err(|e| ProbeError::Read(e.to_string()))? {
                    Message::Text(text) => return Ok(text.into_bytes()),
                    Message::Binary(data) => return Ok(data),
                    Message::Close(_) => break,
                    // Control frames are answered by tungstenite itself.
                    _ => {}
                }
            }
            Err(ProbeError::Read("connection closed before a message arrived".to_string()))
        })
        .await?;

        socket.close(None).await.ok();

        Ok(ProbeResponse::new(payload))
    }

    fn protocol(&self) -> Protocol {
        Protocol::WebSocket
    }

    fn target(&self) -> String {
        self.config.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url() {
        let cfg = WebSocketConfig::new("not a url");
        let err = WebSocketProbe::new(cfg).exchange().await.unwrap_err();
        assert!(matches!(err, ProbeError::Connect(_)));
    }

    #[tokio::test]
    async fn test_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let cfg = WebSocketConfig::new(&format!("ws://127.0.0.1:{port}/")).timeouts(1_000, 1_000);
        let err = WebSocketProbe::new(cfg).exchange().await.unwrap_err();
        assert_eq!(err.stage(), ExchangeStage::Connect);
    }
}
