//! CLI Exit Codes
//!
//! Exit codes for single-probe invocations and automation.

use crate::core::probe::{ProbeError, ProbeOutcome};
use std::process::ExitCode;

/// Exit code constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCodes;

impl ExitCodes {
    /// Success
    pub const SUCCESS: u8 = 0;

    /// General error
    pub const ERROR: u8 = 1;

    /// Invalid arguments or endpoint
    pub const INVALID_ARGS: u8 = 2;

    /// Connection failed
    pub const CONNECTION_FAILED: u8 = 3;

    /// Connect or read timed out
    pub const TIMEOUT: u8 = 4;

    /// Configuration error
    pub const CONFIG_ERROR: u8 = 8;

    /// Write or read failed after connect
    pub const PROTOCOL_ERROR: u8 = 9;
}

/// CLI operation result
#[derive(Debug)]
pub enum CliResult {
    /// Success with optional message
    Success(Option<String>),

    /// Error with code and message
    Error(u8, String),
}

impl CliResult {
    /// Plain success
    pub fn success() -> Self {
        Self::Success(None)
    }

    /// Failure with an explicit exit code
    pub fn error(code: u8, msg: impl Into<String>) -> Self {
        Self::Error(code, msg.into())
    }

    /// Configuration could not be loaded
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Error(ExitCodes::CONFIG_ERROR, msg.into())
    }

    /// Map a probe outcome. Unsupported protocols are not failures.
    pub fn from_outcome(outcome: &ProbeOutcome) -> Self {
        match outcome {
            ProbeOutcome::Response(_) => Self::success(),
            ProbeOutcome::Unsupported(notice) => Self::Success(Some((*notice).to_string())),
            ProbeOutcome::Failed(err) => Self::from(err),
        }
    }

    /// Get exit code
    pub fn code(&self) -> u8 {
        match self {
            Self::Success(_) => ExitCodes::SUCCESS,
            Self::Error(code, _) => *code,
        }
    }

    /// Get message
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(Some(msg)) => Some(msg),
            Self::Error(_, msg) => Some(msg),
            _ => None,
        }
    }

    /// Convert to ExitCode
    pub fn to_exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }

    /// Is success?
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl From<&ProbeError> for CliResult {
    fn from(err: &ProbeError) -> Self {
        let code = match err {
            ProbeError::InvalidEndpoint(_) => ExitCodes::INVALID_ARGS,
            ProbeError::Connect(_) => ExitCodes::CONNECTION_FAILED,
            ProbeError::Timeout { .. } => ExitCodes::TIMEOUT,
            ProbeError::Write(_) | ProbeError::Read(_) => ExitCodes::PROTOCOL_ERROR,
        };
        Self::Error(code, err.to_string())
    }
}

/// Exit code description
pub fn exit_code_description(code: u8) -> &'static str {
    match code {
        0 => "Success",
        1 => "General error",
        2 => "Invalid arguments",
        3 => "Connection failed",
        4 => "Timeout",
        8 => "Configuration error",
        9 => "Protocol error",
        _ => "Unknown error",
    }
}

/// Print exit code table
pub fn print_exit_codes() {
    println!("Exit Codes:");
    for code in [0, 1, 2, 3, 4, 8, 9] {
        println!("  {:>3}  {}", code, exit_code_description(code));
    }
}
