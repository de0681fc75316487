//! UDP probe implementation

use super::{
    bounded, default_connect_timeout_ms, default_read_timeout_ms, Endpoint, ExchangeStage, Probe,
    ProbeError, ProbeResponse, Protocol, READ_BUFFER_SIZE,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::net::UdpSocket;

/// Datagram sent after connect
pub const UDP_GREETING: &str = "Hello, UDP!";

fn default_message() -> String {
    UDP_GREETING.to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:0".to_string()
}

/// UDP probe configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UdpConfig {
    /// Host address
    pub host: String,
    /// Port number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Local address the socket binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Datagram payload
    #[serde(default = "default_message")]
    pub message: String,
    /// Timeout for resolving and fixing the destination, in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Time to wait for the reply datagram, in milliseconds
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

impl UdpConfig {
    /// Create a new UDP configuration
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port: Some(port),
            bind_addr: default_bind_addr(),
            message: default_message(),
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }

    /// Set the local bind address
    #[must_use]
    pub fn bind_addr(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
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

/// UDP probe
pub struct UdpProbe {
    config: UdpConfig,
}

impl UdpProbe {
    /// Create a new UDP probe
    pub fn new(config: UdpConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Probe for UdpProbe {
    async fn exchange(&mut self) -> Result<ProbeResponse, ProbeError> {
        let addr = self.config.endpoint().socket_addr()?;

        let socket = UdpSocket::bind(&self.config.bind_addr)
            .await
            .map_err(|e| ProbeError::Connect(e.to_string()))?;

        // No handshake: this only resolves and fixes the peer address.
        bounded(ExchangeStage::Connect, self.config.connect_timeout_ms, async {
            socket
                .connect(&addr)
                .await
                .map_err(|e| ProbeError::Connect(e.to_string()))
        })
        .await?;
        tracing::debug!(%addr, local = ?socket.local_addr().ok(), "udp destination set");

        socket
            .send(self.config.message.as_bytes())
            .await
            .map_err(|e| ProbeError::Write(e.to_string()))?;

        let mut reply = vec![0u8; READ_BUFFER_SIZE];
        let n = bounded(ExchangeStage::Read, self.config.read_timeout_ms, async {
            socket
                .recv(&mut reply)
                .await
                .map_err(|e| ProbeError::Read(e.to_string()))
        })
        .await?;
        reply.truncate(n);

        Ok(ProbeResponse::new(reply))
    }

    fn protocol(&self) -> Protocol {
        Protocol::Udp
    }

    fn target(&self) -> String {
        self.config.endpoint().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_silent_peer_times_out() {
        // Bound but never answers
        let peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = peer.local_addr().unwrap().port();

        let cfg = UdpConfig::new("127.0.0.1", port).timeouts(1_000, 150);
        let err = UdpProbe::new(cfg).exchange().await.unwrap_err();
        assert!(matches!(
            err,
            ProbeError::Timeout {
                stage: ExchangeStage::Read,
                after_ms: 150
            }
        ));
    }

    #[tokio::test]
    async fn test_bad_bind_addr() {
        let cfg = UdpConfig::new("127.0.0.1", 9).bind_addr("not-an-address");
        let err = UdpProbe::new(cfg).exchange().await.unwrap_err();
        assert_eq!(err.stage(), ExchangeStage::Connect);
    }
}
