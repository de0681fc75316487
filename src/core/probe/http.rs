//! HTTP probe implementation

use super::{
    bounded, default_connect_timeout_ms, default_read_timeout_ms, Endpoint, ExchangeStage, Probe,
    ProbeError, ProbeResponse, Protocol,
};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_path() -> String {
    "/".to_string()
}

fn default_system_proxy() -> bool {
    true
}

/// HTTP probe configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Host name
    pub host: String,
    /// Port, when not the scheme default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Request path, appended verbatim to the host
    #[serde(default = "default_path")]
    pub path: String,
    /// Honor proxy settings from the environment
    #[serde(default = "default_system_proxy")]
    pub system_proxy: bool,
    /// Timeout until response headers arrive, in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Timeout for reading the body, in milliseconds
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

impl HttpConfig {
    /// Create a new HTTP configuration
    pub fn new(host: &str, path: &str) -> Self {
        Self {
            host: host.to_string(),
            port: None,
            path: path.to_string(),
            system_proxy: default_system_proxy(),
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }

    /// Set port
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Enable or disable environment proxies
    #[must_use]
    pub fn system_proxy(mut self, enable: bool) -> Self {
        self.system_proxy = enable;
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
            path: Some(self.path.clone()),
        }
    }

    /// `http://{host}[:{port}]{path}`
    pub fn url(&self) -> String {
        format!("http://{}", self.endpoint())
    }
}

/// HTTP probe
pub struct HttpProbe {
    config: HttpConfig,
}

impl HttpProbe {
    /// Create a new HTTP probe
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    fn client(&self) -> Result<HttpClient, ProbeError> {
        let mut builder = HttpClient::builder()
            .connect_timeout(Duration::from_millis(self.config.connect_timeout_ms));
        if !self.config.system_proxy {
            builder = builder.no_proxy();
        }
        builder
            .build()
            .map_err(|e| ProbeError::Connect(format!("failed to create HTTP client: {e}")))
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn exchange(&mut self) -> Result<ProbeResponse, ProbeError> {
        let url = self.config.url();
        let client = self.client()?;

        let response = bounded(ExchangeStage::Connect, self.config.connect_timeout_ms, async {
            client
                .get(&url)
                .send()
                .await
                .map_err(|e| ProbeError::Connect(e.to_string()))
        })
        .await?;
        tracing::debug!(%url, status = response.status().as_u16(), "http response headers received");

        let body = bounded(ExchangeStage::Read, self.config.read_timeout_ms, async {
            response
                .bytes()
                .await
                .map_err(|e| ProbeError::Read(e.to_string()))
        })
        .await?;

        Ok(ProbeResponse::new(body))
    }

    fn protocol(&self) -> Protocol {
        Protocol::Http
    }

    fn target(&self) -> String {
        self.config.endpoint().to_string()
    }
}
