//! Application Authentication Token.
//!
//! The AAT proves that a client is allowed to relay on behalf of an
//! application. Producing and signing one is somebody else's job; this type
//! only carries the four fields and knows when they are well formed.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::utils::is_hex;

/// Validated Application Authentication Token.
///
/// Field names follow the camelCase form used in stored proof documents.
/// The relay wire form (`app_address`, `client_pub_key`, ...) is produced by
/// [`Proof::to_json`](crate::Proof::to_json).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aat {
    version: String,
    client_public_key: String,
    application_public_key: String,
    application_signature: String,
}

impl Aat {
    /// Build a token, rejecting malformed fields.
    pub fn new(
        version: impl Into<String>,
        client_public_key: impl Into<String>,
        application_public_key: impl Into<String>,
        application_signature: impl Into<String>,
    ) -> Result<Self> {
        let aat = Self {
            version: version.into(),
            client_public_key: client_public_key.into(),
            application_public_key: application_public_key.into(),
            application_signature: application_signature.into(),
        };
        if let Some(reason) = aat.invalid_reason() {
            return Err(Error::InvalidToken(reason.to_string()));
        }
        Ok(aat)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn client_public_key(&self) -> &str {
        &self.client_public_key
    }

    pub fn application_public_key(&self) -> &str {
        &self.application_public_key
    }

    pub fn application_signature(&self) -> &str {
        &self.application_signature
    }

    /// Re-check the token's fields.
    pub fn is_valid(&self) -> bool {
        self.invalid_reason().is_none()
    }

    fn invalid_reason(&self) -> Option<&'static str> {
        if self.version.is_empty() {
            Some("version is empty")
        } else if !is_hex(&self.client_public_key) {
            Some("client public key is not hex")
        } else if !is_hex(&self.application_public_key) {
            Some("application public key is not hex")
        } else if !is_hex(&self.application_signature) {
            Some("application signature is not hex")
        } else {
            None
        }
    }
}
