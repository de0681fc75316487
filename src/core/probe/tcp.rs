//! TCP probe implementation

use super::{
    bounded, default_connect_timeout_ms, default_read_timeout_ms, Endpoint, ExchangeStage, Probe,
    ProbeError, ProbeResponse, Protocol, READ_BUFFER_SIZE,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Greeting written after connect
pub const TCP_GREETING: &str = "Hello, TCP!";

fn default_message() -> String {
    TCP_GREETING.to_string()
}

/// TCP probe configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcpConfig {
    /// Host address
    pub host: String,
    /// Port number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Message written after connect
    #[serde(default = "default_message")]
    pub message: String,
    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Read timeout in milliseconds
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

impl TcpConfig {
    /// Create a new TCP configuration
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port: Some(port),
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

    /// Destination
    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            host: self.host.clone(),
            port: self.port,
            path: None,
        }
    }
}

/// TCP probe
pub struct TcpProbe {
    config: TcpConfig,
}

impl TcpProbe {
    /// Create a new TCP probe
    pub fn new(config: TcpConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Probe for TcpProbe {
    async fn exchange(&mut self) -> Result<ProbeResponse, ProbeError> {
        let addr = self.config.endpoint().socket_addr()?;

        let mut stream = bounded(ExchangeStage::Connect, self.config.connect_timeout_ms, async {
            TcpStream::connect(&addr)
                .await
                .map_err(|e| ProbeError::Connect(e.to_string()))
        })
        .await?;
        tracing::debug!(%addr, "tcp connected");

        stream
            .write_all(self.config.message.as_bytes())
            .await
            .map_err(|e| ProbeError::Write(e.to_string()))?;

        let mut reply = vec![0u8; READ_BUFFER_SIZE];
        let n = bounded(ExchangeStage::Read, self.config.read_timeout_ms, async {
            stream
                .read(&mut reply)
                .await
                .map_err(|e| ProbeError::Read(e.to_string()))
        })
        .await?;
        if n == 0 {
            return Err(ProbeError::Read(
                "connection closed before a reply arrived".to_string(),
            ));
        }
        reply.truncate(n);

        // Best effort; the stream is dropped either way.
        stream.shutdown().await.ok();

        Ok(ProbeResponse::new(reply))
    }

    fn protocol(&self) -> Protocol {
        Protocol::Tcp
    }

    fn target(&self) -> String {
        self.config.endpoint().to_string()
    }
}
