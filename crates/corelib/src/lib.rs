//! Core library for dispatching relays to service nodes.
//!
//! This crate provides the terminal leaf of relay submission:
//! - `Node`: a normalized service node endpoint
//! - `Proof`: the self-validating authentication proof carried by a relay
//! - `Aat`: the application token embedded in a proof
//! - `Relay` / `RelayRequest`: what gets posted
//! - `Node::send_relay`: one HTTP POST, one interpreted response

pub mod aat;
pub mod config;
pub mod constants;
pub mod error;
pub mod network;
pub mod node;
pub mod proof;
pub mod relay;
pub mod utils;

pub use aat::Aat;
pub use config::Configuration;
pub use error::{Error, ProofParseError, Result};
pub use node::Node;
pub use proof::Proof;
pub use relay::{Relay, RelayMeta, RelayPayload, RelayRequest};
