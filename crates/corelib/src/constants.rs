//! Protocol constants shared by the dispatch path.

/// Path on a service node that accepts relay submissions.
pub const RELAY_PATH: &str = "/v1/client/relay";

/// Default per-request timeout, in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

pub(crate) const HTTP_SCHEME: &str = "http://";
pub(crate) const HTTPS_SCHEME: &str = "https://";
pub(crate) const HTTPS_PORT: &str = "443";
