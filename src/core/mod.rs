//! Core module containing the main functionality of Protoprobe
//!
//! This module provides:
//! - Probe layer for the supported protocols and the stub handlers
//! - Report rendering (text, JSON, hex)
//! - The sequential plan runner

pub mod probe;
pub mod report;
pub mod runner;
