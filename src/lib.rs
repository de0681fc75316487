//! # Protoprobe Core Library
//!
//! Minimal request/response probes for:
//! - HTTP GET
//! - Raw TCP
//! - UDP
//! - WebSocket
//!
//! Serial, I2C, SPI, CAN, MQTT and FTP are accepted in plans but only report
//! which crate a real integration would need.
//!
//! ## Example
//!
//! ```rust,no_run
//! use protoprobe_core::{OutputFormat, ProbeSpec, Reporter, Runner, TcpConfig};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let reporter = Reporter::new(std::io::stdout(), OutputFormat::Text);
//!     let mut runner = Runner::new(reporter);
//!
//!     let report = runner
//!         .run_one(ProbeSpec::Tcp(TcpConfig::new("127.0.0.1", 7)))
//!         .await?;
//!     println!("took {:?}", report.elapsed);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;

// Re-exports for convenience
pub use crate::cli::{CliResult, ExitCodes};
pub use crate::config::{AppConfig, ConfigError};
pub use crate::core::probe::{
    create_probe, execute, CanConfig, Endpoint, ExchangeStage, FtpConfig, HttpConfig, I2cConfig,
    MqttConfig, Probe, ProbeError, ProbeHandler, ProbeOutcome, ProbeReport, ProbeResponse,
    ProbeSpec, Protocol, SerialConfig, SpiConfig, TcpConfig, UdpConfig, WebSocketConfig,
};
pub use crate::core::report::{OutputFormat, Reporter};
pub use crate::core::runner::Runner;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
