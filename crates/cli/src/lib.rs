//! CLI tool for working with service nodes and relay proofs.
//!
//! Provides commands for:
//! - Normalizing and checking node addresses
//! - Validating proof documents and printing their wire form
//! - Sending a single relay to a node

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
