//! Application settings

use crate::core::probe::{
    HttpConfig, ProbeSpec, SerialConfig, TcpConfig, UdpConfig, DEFAULT_CONNECT_TIMEOUT_MS,
    DEFAULT_READ_TIMEOUT_MS,
};
use crate::core::report::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be serialized
    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default timeouts for probes built from the command line
    pub timeouts: TimeoutDefaults,
    /// Logging settings
    pub logging: LoggingConfig,
    /// Output settings
    pub output: OutputConfig,
    /// Probes run, in order, when no subcommand is given
    pub probes: Vec<ProbeSpec>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timeouts: TimeoutDefaults::default(),
            logging: LoggingConfig::default(),
            output: OutputConfig::default(),
            probes: demo_plan(),
        }
    }
}

impl AppConfig {
    /// Load config from the platform config directory.
    ///
    /// A missing file, or no config directory at all, yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_or_default(super::config_path().as_deref())
    }

    fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::load_from(path),
            Some(path) => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            None => {
                tracing::debug!("no config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Save config to an explicit file
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Timeouts applied to probes built from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutDefaults {
    /// Connect timeout in milliseconds
    pub connect_ms: u64,
    /// Read timeout in milliseconds
    pub read_ms: u64,
}

impl Default for TimeoutDefaults {
    fn default() -> Self {
        Self {
            connect_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            read_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Output settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: OutputFormat,
    /// Suppress per-probe headers
    pub quiet: bool,
}

/// The example sequence: HTTP, TCP and UDP probes followed by the serial stub
pub fn demo_plan() -> Vec<ProbeSpec> {
    vec![
        ProbeSpec::Http(HttpConfig::new("example.com", "/")),
        ProbeSpec::Tcp(TcpConfig::new("example.com", 80)),
        ProbeSpec::Udp(UdpConfig::new("127.0.0.1", 12345)),
        ProbeSpec::Serial(SerialConfig::new("/dev/ttyUSB0", 9600)),
    ]
}
