//! Subcommands and their output.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Subcommand};
use relay_core::{Configuration, Node, Proof, RelayMeta, RelayPayload, RelayRequest};
use serde_json::{json, Value};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Normalize an address into a service node and report whether it is usable
    Node {
        /// Network / chain identifier, e.g. 0021
        network: String,
        /// Network ID
        net_id: String,
        /// "host:port" or "scheme://host:port"
        address: String,
    },
    /// Validate a proof document and print its wire form
    Proof {
        /// Path to a JSON proof document
        file: PathBuf,
    },
    /// Send one relay to a service node
    Send(SendArgs),
}

#[derive(Debug, Args)]
pub struct SendArgs {
    #[arg(long)]
    pub network: String,

    #[arg(long)]
    pub net_id: String,

    /// Service node address, "host:port" or "scheme://host:port"
    #[arg(long)]
    pub address: String,

    /// Path to a JSON proof document
    #[arg(long)]
    pub proof: PathBuf,

    /// Payload forwarded to the blockchain node
    #[arg(long)]
    pub data: String,

    #[arg(long, default_value = "")]
    pub method: String,

    #[arg(long, default_value = "")]
    pub path: String,

    /// Extra payload header, "Name: value"; repeatable
    #[arg(long = "header")]
    pub headers: Vec<String>,

    #[arg(long, default_value_t = 0)]
    pub block_height: u64,

    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Overrides the configured request timeout
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

/// What a command produced.
#[derive(Debug)]
pub enum CommandResult {
    Node(Node),
    Proof(Proof),
    Relay(Value),
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            CommandResult::Node(node) => json!({
                "network": node.network(),
                "net_id": node.net_id(),
                "ip": node.ip(),
                "port": node.port(),
                "ip_port": node.ip_port(),
                "relay_url": node.relay_url(),
                "valid": node.is_valid(),
            }),
            CommandResult::Proof(proof) => proof.to_json(),
            CommandResult::Relay(value) => value.clone(),
        };
        let pretty = serde_json::to_string_pretty(&value).map_err(|_| fmt::Error)?;
        f.write_str(&pretty)
    }
}

impl Command {
    pub async fn execute(&self) -> anyhow::Result<CommandResult> {
        match self {
            Command::Node {
                network,
                net_id,
                address,
            } => Ok(CommandResult::Node(Node::new(network, net_id, address))),
            Command::Proof { file } => read_proof(file).map(CommandResult::Proof),
            Command::Send(args) => args.send().await.map(CommandResult::Relay),
        }
    }
}

impl SendArgs {
    async fn send(&self) -> anyhow::Result<Value> {
        let node = Node::new(&self.network, &self.net_id, &self.address);
        if !node.is_valid() {
            bail!("node {} is not valid; expected host:port", node);
        }

        let proof = read_proof(&self.proof)?;
        let relay = RelayRequest::new(
            self.payload()?,
            RelayMeta {
                block_height: self.block_height,
            },
            proof,
            self.configuration()?,
        );

        tracing::info!(%node, "dispatching relay");
        let result = node.send_relay(&relay).await?;
        Ok(result)
    }

    fn payload(&self) -> anyhow::Result<RelayPayload> {
        let mut payload = RelayPayload::new(&self.data)
            .with_method(&self.method)
            .with_path(&self.path);
        for raw in &self.headers {
            let (name, value) = raw
                .split_once(':')
                .with_context(|| format!("header {:?} is not \"Name: value\"", raw))?;
            payload = payload.with_header(name.trim(), value.trim());
        }
        Ok(payload)
    }

    fn configuration(&self) -> anyhow::Result<Configuration> {
        let mut config = match &self.config {
            Some(path) => Configuration::load(path)?,
            None => Configuration::default(),
        };
        if let Some(ms) = self.timeout_ms {
            config = config.with_request_timeout(Duration::from_millis(ms));
        }
        Ok(config)
    }
}

fn read_proof(path: &Path) -> anyhow::Result<Proof> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading proof from {}", path.display()))?;
    Proof::from_json(&raw).with_context(|| format!("parsing proof from {}", path.display()))
}
