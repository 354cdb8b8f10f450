//! CLI entry point for relay-cli.

use clap::Parser;
use relay_cli::CliConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    config.init_tracing();
    let result = config.run().await?;
    println!("{}", result);
    Ok(())
}
