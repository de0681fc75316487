//! CLI Module
//!
//! Exit codes for automation

pub mod exit_codes;

pub use exit_codes::{exit_code_description, print_exit_codes, CliResult, ExitCodes};
