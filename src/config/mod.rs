//! Configuration module
//!
//! Handles application settings and the default probe plan

mod settings;

pub use settings::{AppConfig, ConfigError, LoggingConfig, OutputConfig, TimeoutDefaults};

use directories::ProjectDirs;
use std::path::PathBuf;

/// Get the application configuration directory
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "protoprobe", "Protoprobe")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Path of the default `config.toml`
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}
