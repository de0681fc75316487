//! Probe layer for the supported protocols
//!
//! Implemented:
//! - HTTP GET
//! - Raw TCP (connect, write, read)
//! - UDP (connect, write, read)
//! - WebSocket (connect, send text, read first message)
//!
//! Unsupported (notice only, no I/O):
//! - Serial, I2C, SPI, CAN, MQTT, FTP

mod http;
mod stub;
mod tcp;
mod udp;
mod websocket;

pub use http::{HttpConfig, HttpProbe};
pub use stub::{CanConfig, FtpConfig, I2cConfig, MqttConfig, SerialConfig, SpiConfig};
pub use tcp::{TcpConfig, TcpProbe};
pub use udp::{UdpConfig, UdpProbe};
pub use websocket::{WebSocketConfig, WebSocketProbe};

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Size of the single read buffer used by stream and datagram probes
pub const READ_BUFFER_SIZE: usize = 1024;

/// Default connection timeout in milliseconds
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Default read timeout in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 5_000;

pub(crate) fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

pub(crate) fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

/// Protocol identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// HTTP GET
    Http,
    /// Raw TCP
    Tcp,
    /// UDP datagram
    Udp,
    /// WebSocket
    #[serde(rename = "ws")]
    WebSocket,
    /// Serial (UART)
    Serial,
    /// I2C bus
    I2c,
    /// SPI bus
    Spi,
    /// CAN bus
    Can,
    /// MQTT broker
    Mqtt,
    /// FTP server
    Ftp,
}

impl Protocol {
    /// All protocols, in the order they are listed to users
    pub fn all() -> &'static [Protocol] {
        &[
            Self::Http,
            Self::Tcp,
            Self::Udp,
            Self::WebSocket,
            Self::Serial,
            Self::I2c,
            Self::Spi,
            Self::Can,
            Self::Mqtt,
            Self::Ftp,
        ]
    }

    /// What kind of target the protocol talks to ("server", "port", "bus")
    pub fn target_noun(&self) -> &'static str {
        match self {
            Self::Serial => "port",
            Self::I2c | Self::Spi | Self::Can => "bus",
            _ => "server",
        }
    }

    /// Whether a real exchange is performed for this protocol
    pub fn is_implemented(&self) -> bool {
        matches!(self, Self::Http | Self::Tcp | Self::Udp | Self::WebSocket)
    }

    /// Line printed once a stream connection is up, if the protocol has one
    pub fn connected_notice(&self) -> Option<&'static str> {
        match self {
            Self::Tcp => Some("Connected to TCP server."),
            Self::WebSocket => Some("WebSocket connection established."),
            _ => None,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "HTTP"),
            Self::Tcp => write!(f, "TCP"),
            Self::Udp => write!(f, "UDP"),
            Self::WebSocket => write!(f, "WebSocket"),
            Self::Serial => write!(f, "Serial"),
            Self::I2c => write!(f, "I2C"),
            Self::Spi => write!(f, "SPI"),
            Self::Can => write!(f, "CAN"),
            Self::Mqtt => write!(f, "MQTT"),
            Self::Ftp => write!(f, "FTP"),
        }
    }
}

/// Where a probe connects to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Host name or address
    pub host: String,
    /// Port number
    pub port: Option<u16>,
    /// Request path (HTTP only)
    pub path: Option<String>,
}

impl Endpoint {
    /// Create an endpoint with a host only
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            port: None,
            path: None,
        }
    }

    /// Set port
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set path
    #[must_use]
    pub fn path(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    /// `host:port`, failing when no port is set
    pub fn socket_addr(&self) -> Result<String, ProbeError> {
        let port = self
            .port
            .ok_or_else(|| ProbeError::InvalidEndpoint(format!("{} has no port", self.host)))?;
        Ok(format!("{}:{}", self.host, port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        if let Some(path) = &self.path {
            write!(f, "{path}")?;
        }
        Ok(())
    }
}

/// Step of the exchange an error happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeStage {
    /// Establishing the connection or sending the request
    Connect,
    /// Writing the greeting
    Write,
    /// Reading the response
    Read,
}

impl fmt::Display for ExchangeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connect"),
            Self::Write => write!(f, "write"),
            Self::Read => write!(f, "read"),
        }
    }
}

/// Probe error types
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Endpoint is missing something the protocol needs
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Transport could not be established
    #[error("{0}")]
    Connect(String),

    /// Send failed after connect
    #[error("{0}")]
    Write(String),

    /// Response could not be fully retrieved
    #[error("{0}")]
    Read(String),

    /// Bounded wait expired
    #[error("timed out after {after_ms} ms")]
    Timeout {
        /// Stage that was waiting
        stage: ExchangeStage,
        /// Configured bound
        after_ms: u64,
    },
}

impl ProbeError {
    /// Stage the error belongs to
    pub fn stage(&self) -> ExchangeStage {
        match self {
            Self::InvalidEndpoint(_) | Self::Connect(_) => ExchangeStage::Connect,
            Self::Write(_) => ExchangeStage::Write,
            Self::Read(_) => ExchangeStage::Read,
            Self::Timeout { stage, .. } => *stage,
        }
    }

    /// Short machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidEndpoint(_) => "invalid_endpoint",
            Self::Connect(_) => "connect",
            Self::Write(_) => "write",
            Self::Read(_) => "read",
            Self::Timeout { .. } => "timeout",
        }
    }
}

/// Run `fut` with a bound, mapping expiry to [`ProbeError::Timeout`]
pub(crate) async fn bounded<T, F>(stage: ExchangeStage, after_ms: u64, fut: F) -> Result<T, ProbeError>
where
    F: Future<Output = Result<T, ProbeError>>,
{
    tokio::time::timeout(Duration::from_millis(after_ms), fut)
        .await
        .map_err(|_| ProbeError::Timeout { stage, after_ms })?
}

/// Payload returned by a successful exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    /// Raw bytes received
    pub payload: Bytes,
}

impl ProbeResponse {
    /// Wrap received bytes
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Payload as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// A single request/response exchange against one endpoint.
///
/// Implementations own their socket only for the duration of
/// [`Probe::exchange`], so it is closed on every return path.
#[async_trait]
pub trait Probe: Send {
    /// Open, write, read, close
    async fn exchange(&mut self) -> Result<ProbeResponse, ProbeError>;

    /// Protocol spoken
    fn protocol(&self) -> Protocol;

    /// Destination description
    fn target(&self) -> String;
}

/// How a probe spec is handled
pub enum ProbeHandler {
    /// A real exchange
    Implemented(Box<dyn Probe>),
    /// No integration; only a notice is reported
    Unsupported(&'static str),
}

/// Outcome of one probe
#[derive(Debug)]
pub enum ProbeOutcome {
    /// Exchange completed
    Response(ProbeResponse),
    /// Exchange failed
    Failed(ProbeError),
    /// Stub handler notice
    Unsupported(&'static str),
}

impl ProbeOutcome {
    /// Did the exchange complete?
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Response(_))
    }
}

/// Result of running one probe
#[derive(Debug)]
pub struct ProbeReport {
    /// Protocol probed
    pub protocol: Protocol,
    /// Destination description
    pub target: String,
    /// What happened
    pub outcome: ProbeOutcome,
    /// Wall time spent
    pub elapsed: Duration,
}

impl ProbeReport {
    /// Whether the stream connection was established before the outcome
    pub fn connected(&self) -> bool {
        match &self.outcome {
            ProbeOutcome::Response(_) => true,
            ProbeOutcome::Failed(e) => e.stage() != ExchangeStage::Connect,
            ProbeOutcome::Unsupported(_) => false,
        }
    }
}

/// Probe configuration, one variant per protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "lowercase")]
pub enum ProbeSpec {
    /// HTTP GET
    Http(HttpConfig),
    /// Raw TCP
    Tcp(TcpConfig),
    /// UDP
    Udp(UdpConfig),
    /// WebSocket
    #[serde(rename = "ws", alias = "websocket")]
    WebSocket(WebSocketConfig),
    /// Serial stub
    Serial(SerialConfig),
    /// I2C stub
    I2c(I2cConfig),
    /// SPI stub
    Spi(SpiConfig),
    /// CAN stub
    Can(CanConfig),
    /// MQTT stub
    Mqtt(MqttConfig),
    /// FTP stub
    Ftp(FtpConfig),
}

impl ProbeSpec {
    /// Protocol of this spec
    pub fn protocol(&self) -> Protocol {
        match self {
            Self::Http(_) => Protocol::Http,
            Self::Tcp(_) => Protocol::Tcp,
            Self::Udp(_) => Protocol::Udp,
            Self::WebSocket(_) => Protocol::WebSocket,
            Self::Serial(_) => Protocol::Serial,
            Self::I2c(_) => Protocol::I2c,
            Self::Spi(_) => Protocol::Spi,
            Self::Can(_) => Protocol::Can,
            Self::Mqtt(_) => Protocol::Mqtt,
            Self::Ftp(_) => Protocol::Ftp,
        }
    }

    /// Destination description
    pub fn target(&self) -> String {
        match self {
            Self::Http(cfg) => cfg.endpoint().to_string(),
            Self::Tcp(cfg) => cfg.endpoint().to_string(),
            Self::Udp(cfg) => cfg.endpoint().to_string(),
            Self::WebSocket(cfg) => cfg.url.clone(),
            Self::Serial(cfg) => format!("{} @ {} baud", cfg.port, cfg.baud_rate),
            Self::I2c(cfg) => format!("bus {}", cfg.bus),
            Self::Spi(cfg) => format!("bus {} device {}", cfg.bus, cfg.device),
            Self::Can(cfg) => cfg.interface.clone(),
            Self::Mqtt(cfg) => format!("{}:{}", cfg.broker, cfg.port),
            Self::Ftp(cfg) => format!("{}@{}", cfg.username, cfg.host),
        }
    }

    /// Override connect and read timeouts where the protocol has them
    pub fn set_timeouts(&mut self, connect_ms: Option<u64>, read_ms: Option<u64>) {
        let (connect, read) = match self {
            Self::Http(cfg) => (&mut cfg.connect_timeout_ms, &mut cfg.read_timeout_ms),
            Self::Tcp(cfg) => (&mut cfg.connect_timeout_ms, &mut cfg.read_timeout_ms),
            Self::Udp(cfg) => (&mut cfg.connect_timeout_ms, &mut cfg.read_timeout_ms),
            Self::WebSocket(cfg) => (&mut cfg.connect_timeout_ms, &mut cfg.read_timeout_ms),
            _ => return,
        };
        if let Some(ms) = connect_ms {
            *connect = ms;
        }
        if let Some(ms) = read_ms {
            *read = ms;
        }
    }
}

/// Create the handler for a probe spec
pub fn create_probe(spec: ProbeSpec) -> ProbeHandler {
    match spec {
        ProbeSpec::Http(cfg) => ProbeHandler::Implemented(Box::new(HttpProbe::new(cfg))),
        ProbeSpec::Tcp(cfg) => ProbeHandler::Implemented(Box::new(TcpProbe::new(cfg))),
        ProbeSpec::Udp(cfg) => ProbeHandler::Implemented(Box::new(UdpProbe::new(cfg))),
        ProbeSpec::WebSocket(cfg) => ProbeHandler::Implemented(Box::new(WebSocketProbe::new(cfg))),
        ProbeSpec::Serial(_) => ProbeHandler::Unsupported(stub::SERIAL_NOTICE),
        ProbeSpec::I2c(_) => ProbeHandler::Unsupported(stub::I2C_NOTICE),
        ProbeSpec::Spi(_) => ProbeHandler::Unsupported(stub::SPI_NOTICE),
        ProbeSpec::Can(_) => ProbeHandler::Unsupported(stub::CAN_NOTICE),
        ProbeSpec::Mqtt(_) => ProbeHandler::Unsupported(stub::MQTT_NOTICE),
        ProbeSpec::Ftp(_) => ProbeHandler::Unsupported(stub::FTP_NOTICE),
    }
}

/// Run one probe to completion and collect its report
pub async fn execute(spec: ProbeSpec) -> ProbeReport {
    let protocol = spec.protocol();
    let target = spec.target();
    let started = Instant::now();

    let outcome = match create_probe(spec) {
        ProbeHandler::Implemented(mut probe) => {
            tracing::debug!(protocol = %probe.protocol(), target = %probe.target(), "starting exchange");
            match probe.exchange().await {
                Ok(response) => {
                    tracing::info!(%protocol, %target, bytes = response.payload.len(), "exchange complete");
                    ProbeOutcome::Response(response)
                }
                Err(e) => {
                    tracing::warn!(%protocol, %target, kind = e.kind(), error = %e, "exchange failed");
                    ProbeOutcome::Failed(e)
                }
            }
        }
        ProbeHandler::Unsupported(notice) => {
            tracing::debug!(%protocol, "no integration for protocol");
            ProbeOutcome::Unsupported(notice)
        }
    };

    ProbeReport {
        protocol,
        target,
        outcome,
        elapsed: started.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_display() {
        let ep = Endpoint::new("example.com").port(8080).path("/status");
        assert_eq!(ep.to_string(), "example.com:8080/status");
        assert_eq!(Endpoint::new("example.com").to_string(), "example.com");
    }

    #[test]
    fn test_socket_addr_requires_port() {
        let err = Endpoint::new("example.com").socket_addr().unwrap_err();
        assert_eq!(err.kind(), "invalid_endpoint");
        assert_eq!(
            Endpoint::new("127.0.0.1").port(12345).socket_addr().unwrap(),
            "127.0.0.1:12345"
        );
    }

    #[test]
    fn test_error_stage() {
        assert_eq!(ProbeError::Connect("refused".into()).stage(), ExchangeStage::Connect);
        assert_eq!(ProbeError::Write("broken pipe".into()).stage(), ExchangeStage::Write);
        let timeout = ProbeError::Timeout {
            stage: ExchangeStage::Read,
            after_ms: 250,
        };
        assert_eq!(timeout.stage(), ExchangeStage::Read);
        assert_eq!(timeout.to_string(), "timed out after 250 ms");
    }

    #[test]
    fn test_protocol_names_match_plan_tags() {
        assert_eq!(serde_json::to_value(Protocol::WebSocket).unwrap(), "ws");
        assert_eq!(serde_json::to_value(Protocol::I2c).unwrap(), "i2c");
        let spec = ProbeSpec::WebSocket(WebSocketConfig::new("ws://127.0.0.1:9/"));
        let tagged = serde_json::to_value(&spec).unwrap();
        assert_eq!(tagged["protocol"], serde_json::to_value(spec.protocol()).unwrap());
    }

    #[test]
    fn test_implemented_protocols() {
        let implemented: Vec<_> = Protocol::all().iter().filter(|p| p.is_implemented()).collect();
        assert_eq!(implemented.len(), 4);
        assert!(!Protocol::Mqtt.is_implemented());
        assert_eq!(Protocol::Can.target_noun(), "bus");
    }

    #[test]
    fn test_stub_specs_are_unsupported() {
        let spec = ProbeSpec::Mqtt(MqttConfig::new("broker.local", 1883));
        assert!(matches!(create_probe(spec), ProbeHandler::Unsupported(_)));
        let spec = ProbeSpec::Tcp(TcpConfig::new("localhost", 7));
        assert!(matches!(create_probe(spec), ProbeHandler::Implemented(_)));
    }

    #[test]
    fn test_set_timeouts() {
        let mut spec = ProbeSpec::Udp(UdpConfig::new("127.0.0.1", 12345));
        spec.set_timeouts(None, Some(100));
        match spec {
            ProbeSpec::Udp(cfg) => {
                assert_eq!(cfg.read_timeout_ms, 100);
                assert_eq!(cfg.connect_timeout_ms, DEFAULT_CONNECT_TIMEOUT_MS);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_spec_from_toml() {
        let spec: ProbeSpec = toml::from_str(
            r#"
            protocol = "tcp"
            host = "example.com"
            port = 80
            "#,
        )
        .unwrap();
        assert_eq!(spec, ProbeSpec::Tcp(TcpConfig::new("example.com", 80)));
    }
}
