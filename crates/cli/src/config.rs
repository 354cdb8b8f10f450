//! Top-level CLI arguments and logging setup.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::commands::{Command, CommandResult};

/// Work with service nodes and relay proofs.
#[derive(Debug, Parser)]
#[command(name = "relay-cli", version)]
pub struct CliConfig {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Install the global tracing subscriber. `RUST_LOG` wins over `-v`.
    pub fn init_tracing(&self) {
        let default_level = if self.verbose { "debug" } else { "info" };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        // A subscriber may already be installed (tests); that is fine.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    }

    pub async fn run(&self) -> anyhow::Result<CommandResult> {
        self.command.execute().await
    }
}
