//! Relay dispatch to service nodes.
//!
//! One relay, one HTTP POST. Every call builds its own client from the
//! relay's [`Configuration`] so that timeouts and TLS policy never leak
//! between relays. No retries happen here.
//!
//! # Outcomes
//!
//! | Response                     | Result                          |
//! |------------------------------|---------------------------------|
//! | `200` with a non-null body   | `Ok(body)`                      |
//! | `200` with `null`            | `Err(Error::RelayDispatch)`     |
//! | any other status             | `Err(Error::RelayDispatch)`     |
//! | timeout / connect / decode   | `Err(Error::RelayDispatch)`     |

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::config::Configuration;
use crate::constants::RELAY_PATH;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::relay::Relay;

impl Node {
    /// Full URL relays are posted to.
    pub fn relay_url(&self) -> String {
        format!("{}{}", self.ip_port().trim_end_matches('/'), RELAY_PATH)
    }

    /// Send `relay` to this node and return the node's JSON response.
    ///
    /// Failures of any kind come back as [`Error::RelayDispatch`]; this
    /// never panics. Callers are expected to have checked
    /// [`Node::is_valid`] beforehand.
    pub async fn send_relay<R>(&self, relay: &R) -> Result<Value>
    where
        R: Relay + ?Sized,
    {
        let url = self.relay_url();
        let timeout = relay.configuration().request_timeout;
        tracing::debug!(node = %self, %url, timeout_ms = timeout.as_millis() as u64, "sending relay");

        let outcome = post_relay(&url, relay).await;
        match &outcome {
            Ok(_) => tracing::debug!(node = %self, "relay accepted"),
            Err(err) => tracing::warn!(node = %self, error = %err, "relay failed"),
        }
        outcome
    }

    /// Callback flavour of [`Node::send_relay`].
    ///
    /// The relay is sent exactly once and its outcome handed to `callback`,
    /// so both flavours always agree.
    pub async fn send_relay_with_callback<R, F>(&self, relay: &R, callback: F)
    where
        R: Relay + ?Sized,
        F: FnOnce(Result<Value>),
    {
        callback(self.send_relay(relay).await);
    }
}

async fn post_relay<R>(url: &str, relay: &R) -> Result<Value>
where
    R: Relay + ?Sized,
{
    let config = relay.configuration();
    let client = build_client(config).map_err(Error::dispatch)?;

    let response = client
        .post(url)
        .json(&relay.to_json())
        .send()
        .await
        .map_err(|e| transport_error(e, config))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(e, config))?;

    if status != StatusCode::OK {
        return Err(Error::dispatch(format!("{} {}", status, body).trim_end()));
    }

    let value: Value = serde_json::from_str(&body).map_err(Error::dispatch)?;
    if value.is_null() {
        return Err(Error::dispatch(value));
    }
    Ok(value)
}

fn build_client(config: &Configuration) -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Client::builder()
        .default_headers(headers)
        .timeout(config.request_timeout)
        .danger_accept_invalid_certs(!config.reject_self_signed_certificates)
        .build()
}

fn transport_error(err: reqwest::Error, config: &Configuration) -> Error {
    if err.is_timeout() {
        Error::dispatch(format!(
            "request timed out after {}ms: {}",
            config.request_timeout.as_millis(),
            err
        ))
    } else {
        Error::dispatch(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_url() {
        let node = Node::new("0021", "4", "10.0.0.1:8081");
        assert_eq!(node.relay_url(), "http://10.0.0.1:8081/v1/client/relay");

        let node = Node::new("0021", "4", "https://node.example.com/");
        assert_eq!(node.relay_url(), "https://node.example.com/v1/client/relay");
    }

    #[test]
    fn test_client_builds_for_both_tls_policies() {
        let strict = Configuration::default();
        let lax = Configuration {
            reject_self_signed_certificates: false,
            ..Configuration::default()
        };
        assert!(build_client(&strict).is_ok());
        assert!(build_client(&lax).is_ok());
    }
}
