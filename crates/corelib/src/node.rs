//! Service node endpoints.
//!
//! A `Node` is one remote service node: which network it serves, under which
//! network ID, and the base URL relays are posted to. It is a plain value,
//! cheap to clone and safe to share; dispatch lives in [`crate::network`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{HTTPS_PORT, HTTPS_SCHEME, HTTP_SCHEME};

/// Addressable service node.
///
/// # Invariants
///
/// - `ip_port` always starts with `http://` or `https://` (any letter case)
/// - a node is usable for dispatch only when [`Node::is_valid`] holds
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "NodeRecord", into = "NodeRecord")]
pub struct Node {
    network: String,
    net_id: String,
    ip: String,
    port: String,
    ip_port: String,
}

impl Node {
    /// Create a node from `"host:port"` or `"scheme://host:port"`.
    ///
    /// # Algorithm
    ///
    /// 1. Strip a leading `http://` / `https://` if present, in any letter case
    /// 2. Split the remaining authority on its last `:` into host and port
    /// 3. Scheme given: keep the input verbatim as the base URL. A missing
    ///    port defaults to the scheme's well-known port.
    /// 4. No scheme: `https://` when the port is `"443"`, `http://` otherwise
    ///
    /// Construction never fails. Input without a usable host or port gives a
    /// node whose [`Node::is_valid`] is false.
    ///
    /// # Example
    /// ```rust
    /// use relay_core::Node;
    ///
    /// let node = Node::new("0021", "mainnet", "10.0.0.1:443");
    /// assert_eq!(node.ip_port(), "https://10.0.0.1:443");
    /// assert_eq!(node.port(), "443");
    /// ```
    pub fn new(network: impl Into<String>, net_id: impl Into<String>, ip_port: impl Into<String>) -> Self {
        let raw = ip_port.into();
        let address = Address::parse(&raw);

        let ip_port = match address.scheme {
            Some(_) => raw.clone(),
            None if address.port == HTTPS_PORT => format!("{}{}", HTTPS_SCHEME, raw),
            None => format!("{}{}", HTTP_SCHEME, raw),
        };

        Self {
            network: network.into(),
            net_id: net_id.into(),
            ip: address.host.to_string(),
            port: address.port.to_string(),
            ip_port,
        }
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn net_id(&self) -> &str {
        &self.net_id
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    /// Base URL including scheme.
    pub fn ip_port(&self) -> &str {
        &self.ip_port
    }

    /// True when every identifying field is non-empty.
    pub fn is_valid(&self) -> bool {
        [
            &self.network,
            &self.net_id,
            &self.ip,
            &self.port,
            &self.ip_port,
        ]
        .iter()
        .all(|field| !field.is_empty())
    }

    /// Compare against a network ID and network, both taken as strings.
    ///
    /// ```rust
    /// use relay_core::Node;
    ///
    /// let node = Node::new("0021", "4", "10.0.0.1:8081");
    /// assert!(node.is_equal(4, "0021"));
    /// ```
    pub fn is_equal(&self, net_id: impl fmt::Display, network: impl fmt::Display) -> bool {
        self.net_id == net_id.to_string() && self.network == network.to_string()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.network, self.net_id, self.ip_port)
    }
}

/// Persisted form of a node; the derived fields are rebuilt on load.
#[derive(Serialize, Deserialize)]
struct NodeRecord {
    network: String,
    net_id: String,
    address: String,
}

impl From<NodeRecord> for Node {
    fn from(record: NodeRecord) -> Self {
        Node::new(record.network, record.net_id, record.address)
    }
}

impl From<Node> for NodeRecord {
    fn from(node: Node) -> Self {
        NodeRecord {
            network: node.network,
            net_id: node.net_id,
            address: node.ip_port,
        }
    }
}

/// Pieces of a raw address string.
struct Address<'a> {
    scheme: Option<&'static str>,
    host: &'a str,
    port: &'a str,
}

impl<'a> Address<'a> {
    fn parse(raw: &'a str) -> Self {
        let (scheme, rest) = if let Some(rest) = strip_scheme(raw, HTTPS_SCHEME) {
            (Some(HTTPS_SCHEME), rest)
        } else if let Some(rest) = strip_scheme(raw, HTTP_SCHEME) {
            (Some(HTTP_SCHEME), rest)
        } else {
            (None, raw)
        };

        // Anything after the authority (a path) plays no part in host/port.
        let authority = rest.split('/').next().unwrap_or_default();

        // "[::1]" has colons but no port.
        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) if !authority.ends_with(']') => (host, port),
            _ => (authority, ""),
        };

        let port = match (port, scheme) {
            ("", Some(HTTPS_SCHEME)) => HTTPS_PORT,
            ("", Some(_)) => "80",
            (port, _) => port,
        };

        Self { scheme, host, port }
    }
}

/// Schemes are case-insensitive (RFC 3986 section 3.1).
fn strip_scheme<'a>(raw: &'a str, scheme: &str) -> Option<&'a str> {
    raw.get(..scheme.len())
        .filter(|prefix| prefix.eq_ignore_ascii_case(scheme))
        .map(|_| &raw[scheme.len()..])
}
