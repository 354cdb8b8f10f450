//! Relay requests.
//!
//! [`Node::send_relay`](crate::Node::send_relay) only needs two things from a
//! relay: the JSON body to post and the configuration to post it with. The
//! [`Relay`] trait is that seam. [`RelayRequest`] is the plain value most
//! callers will use; signing it is left to whoever builds it.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::config::Configuration;
use crate::proof::Proof;

/// Anything that can be dispatched to a service node.
pub trait Relay: Send + Sync {
    /// JSON body posted to the node.
    fn to_json(&self) -> Value;

    /// Dispatch settings (timeout, TLS policy).
    fn configuration(&self) -> &Configuration;
}

/// What the application wants the service node to forward to the chain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RelayPayload {
    pub data: String,
    pub method: String,
    pub path: String,
    pub headers: BTreeMap<String, String>,
}

impl RelayPayload {
    /// A payload with only a body; method and path left empty.
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Relay metadata.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RelayMeta {
    pub block_height: u64,
}

/// A relay ready to be dispatched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayRequest {
    pub payload: RelayPayload,
    pub meta: RelayMeta,
    pub proof: Proof,
    pub configuration: Configuration,
}

impl RelayRequest {
    pub fn new(payload: RelayPayload, meta: RelayMeta, proof: Proof, configuration: Configuration) -> Self {
        Self {
            payload,
            meta,
            proof,
            configuration,
        }
    }
}

impl Relay for RelayRequest {
    fn to_json(&self) -> Value {
        serde_json::json!({
            "payload": self.payload,
            "meta": self.meta,
            "proof": self.proof.to_json(),
        })
    }

    fn configuration(&self) -> &Configuration {
        &self.configuration
    }
}
