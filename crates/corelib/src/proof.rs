//! Relay proof.
//!
//! A `Proof` travels inside every relay and tells the service node which
//! session the relay belongs to and which application token authorizes it.
//! Instances are validated once, at construction, and never change after.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "entropy": 3,
//!   "session_block_height": 5,
//!   "servicer_pub_key": "ab..",
//!   "blockchain": "0021",
//!   "signature": "",
//!   "aat": {
//!     "version": "0.0.1",
//!     "app_address": "<application public key>",
//!     "client_pub_key": "<client public key>",
//!     "signature": "<application signature>"
//!   }
//! }
//! ```
//!
//! # Numeric precision
//!
//! `entropy` and `session_block_height` are arbitrary precision in memory
//! but go out as ordinary JSON numbers, narrowed through `f64` the same way
//! every JavaScript node on the network reads them. Above 2^53 the emitted
//! value loses precision; that is part of the contract, not a bug to be
//! patched here. Callers that must move exact large values between processes
//! can pass them as decimal strings to [`Proof::from_json`].

use std::fmt;

use num_bigint::BigInt;
use num_traits::{FromPrimitive, Signed, ToPrimitive};
use serde::{Serialize, Serializer};
use serde_json::{json, Number, Value};

use crate::aat::Aat;
use crate::error::{Error, ProofParseError, Result};
use crate::utils::is_hex;

/// Authentication proof attached to a relay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proof {
    entropy: BigInt,
    session_block_height: BigInt,
    service_pub_key: String,
    blockchain: String,
    token: Aat,
    signature: String,
}

impl Proof {
    /// Build a proof from its parts.
    ///
    /// # Arguments
    /// * `entropy` - Index entropy value
    /// * `session_block_height` - Height the session started at, must be > 0
    /// * `service_pub_key` - Hex public key of the servicing node
    /// * `blockchain` - Non-empty chain identifier
    /// * `token` - Application Authentication Token
    /// * `signature` - Proof signature; empty means "not signed yet"
    ///
    /// # Errors
    /// [`Error::InvalidProof`] naming the first field that failed.
    pub fn new(
        entropy: impl Into<BigInt>,
        session_block_height: impl Into<BigInt>,
        service_pub_key: impl Into<String>,
        blockchain: impl Into<String>,
        token: Aat,
        signature: impl Into<String>,
    ) -> Result<Self> {
        let proof = Self {
            entropy: entropy.into(),
            session_block_height: session_block_height.into(),
            service_pub_key: service_pub_key.into(),
            blockchain: blockchain.into(),
            token,
            signature: signature.into(),
        };
        if let Some(reason) = proof.invalid_reason() {
            return Err(Error::InvalidProof(reason.to_string()));
        }
        Ok(proof)
    }

    /// Parse a proof document.
    ///
    /// The token may be given either as `token` with camelCase fields
    /// (`version`, `clientPublicKey`, `applicationPublicKey`,
    /// `applicationSignature`) or in the relay wire form `aat` produced by
    /// [`Proof::to_json`]. Everything else uses the snake_case wire names.
    ///
    /// # Errors
    /// Always [`Error::ProofParse`]; the wrapped [`ProofParseError`] says
    /// whether the token was missing, the JSON was malformed, or a field
    /// failed validation.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::parse(json).map_err(|err| {
            tracing::trace!(error = %err, "rejected proof document");
            Error::from(err)
        })
    }

    fn parse(json: &str) -> std::result::Result<Self, ProofParseError> {
        let doc: Value = serde_json::from_str(json)?;
        let token = read_token(&doc)?;

        let proof = Proof::new(
            read_integer(&doc, "entropy")?,
            read_integer(&doc, "session_block_height")?,
            read_str(&doc, "servicer_pub_key")?,
            read_str(&doc, "blockchain")?,
            token,
            read_str(&doc, "signature")?,
        )?;
        Ok(proof)
    }

    /// Canonical wire representation sent to service nodes.
    pub fn to_json(&self) -> Value {
        json!({
            "entropy": narrow(&self.entropy),
            "session_block_height": narrow(&self.session_block_height),
            "servicer_pub_key": self.service_pub_key,
            "blockchain": self.blockchain,
            "signature": self.signature,
            "aat": {
                "version": self.token.version(),
                "app_address": self.token.application_public_key(),
                "client_pub_key": self.token.client_public_key(),
                "signature": self.token.application_signature(),
            }
        })
    }

    /// Wire representation as a compact JSON string.
    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }

    /// Re-derive the construction invariant from the current fields.
    ///
    /// Always true for a `Proof` obtained through [`Proof::new`] or
    /// [`Proof::from_json`].
    pub fn is_valid(&self) -> bool {
        self.invalid_reason().is_none()
    }

    fn invalid_reason(&self) -> Option<&'static str> {
        if self.blockchain.is_empty() {
            Some("blockchain is empty")
        } else if !is_finite_number(&self.entropy) {
            Some("entropy is not representable as a number")
        } else if !is_hex(&self.service_pub_key) {
            Some("service public key is not hex")
        } else if !self.session_block_height.is_positive() {
            Some("session block height must be positive")
        } else if !is_finite_number(&self.session_block_height) {
            Some("session block height is not representable as a number")
        } else if !self.token.is_valid() {
            Some("token is invalid")
        } else {
            None
        }
    }

    pub fn entropy(&self) -> &BigInt {
        &self.entropy
    }

    pub fn session_block_height(&self) -> &BigInt {
        &self.session_block_height
    }

    pub fn service_pub_key(&self) -> &str {
        &self.service_pub_key
    }

    pub fn blockchain(&self) -> &str {
        &self.blockchain
    }

    pub fn token(&self) -> &Aat {
        &self.token
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// True once a signature has been attached.
    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }
}

impl fmt::Display for Proof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl Serialize for Proof {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn read_token(doc: &Value) -> std::result::Result<Aat, ProofParseError> {
    let present = |key: &str| doc.get(key).filter(|v| !v.is_null());

    let aat = if let Some(token) = present("token") {
        Aat::new(
            read_str(token, "version")?,
            read_str(token, "clientPublicKey")?,
            read_str(token, "applicationPublicKey")?,
            read_str(token, "applicationSignature")?,
        )?
    } else if let Some(aat) = present("aat") {
        Aat::new(
            read_str(aat, "version")?,
            read_str(aat, "client_pub_key")?,
            read_str(aat, "app_address")?,
            read_str(aat, "signature")?,
        )?
    } else {
        return Err(ProofParseError::TokenMissing);
    };
    Ok(aat)
}

/// Missing or `null` reads as `""`; any other non-string is rejected.
fn read_str<'a>(doc: &'a Value, key: &str) -> Result<&'a str> {
    match doc.get(key) {
        None | Some(Value::Null) => Ok(""),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(Error::InvalidProof(format!("{} is not a string", key))),
    }
}

/// Accepts JSON integers, integral floats, and decimal strings.
fn read_integer(doc: &Value, key: &str) -> Result<BigInt> {
    let parsed = match doc.get(key) {
        Some(Value::Number(n)) => number_to_bigint(n),
        Some(Value::String(s)) => s.trim().parse::<BigInt>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| Error::InvalidProof(format!("{} is not an integer", key)))
}

fn number_to_bigint(n: &Number) -> Option<BigInt> {
    if let Some(v) = n.as_i64() {
        return Some(BigInt::from(v));
    }
    if let Some(v) = n.as_u64() {
        return Some(BigInt::from(v));
    }
    n.as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .and_then(BigInt::from_f64)
}

/// Both numeric fields must survive narrowing, or `to_json` would emit `null`.
fn is_finite_number(value: &BigInt) -> bool {
    value.to_f64().map_or(false, f64::is_finite)
}

/// Narrow through `f64`; integral values that fit `i64` are written as JSON
/// integers so small heights do not come out as `5.0`.
fn narrow(value: &BigInt) -> Value {
    let approx = value.to_f64().unwrap_or(f64::NAN);
    if approx.fract() == 0.0 && approx >= i64::MIN as f64 && approx < i64::MAX as f64 {
        Value::from(approx as i64)
    } else {
        Value::from(approx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICER: &str = "a7b2c9d4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c6d7e8f90";

    fn token() -> Aat {
        Aat::new("0.0.1", "c1c1", "a9a9", "5151").unwrap()
    }

    fn proof() -> Proof {
        Proof::new(3, 5, SERVICER, "0021", token(), "").unwrap()
    }

    #[test]
    fn test_new_valid_proof() {
        let p = proof();
        assert!(p.is_valid());
        assert!(!p.is_signed());
        assert_eq!(p.session_block_height(), &BigInt::from(5));
        assert_eq!(p.blockchain(), "0021");
    }

    #[test]
    fn test_rejects_non_positive_height() {
        for height in [0, -1] {
            let err = Proof::new(3, height, SERVICER, "0021", token(), "").unwrap_err();
            assert!(matches!(err, Error::InvalidProof(_)), "height {}", height);
        }
    }

    #[test]
    fn test_rejects_non_hex_servicer_key() {
        let err = Proof::new(3, 5, "not-a-key", "0021", token(), "").unwrap_err();
        assert!(err.to_string().contains("service public key"));
    }

    #[test]
    fn test_rejects_empty_blockchain() {
        let err = Proof::new(3, 5, SERVICER, "", token(), "").unwrap_err();
        assert!(err.to_string().contains("blockchain"));
    }

    #[test]
    fn test_to_json_shape() {
        let value = proof().to_json();
        assert_eq!(
            value,
            json!({
                "entropy": 3,
                "session_block_height": 5,
                "servicer_pub_key": SERVICER,
                "blockchain": "0021",
                "signature": "",
                "aat": {
                    "version": "0.0.1",
                    "app_address": "a9a9",
                    "client_pub_key": "c1c1",
                    "signature": "5151"
                }
            })
        );
    }

    #[test]
    fn test_round_trip_through_wire_string() {
        let original = Proof::new(42, 7, SERVICER, "0021", token(), "beef").unwrap();
        let parsed = Proof::from_json(&original.to_json_string()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_from_json_token_form() {
        let doc = json!({
            "entropy": 9,
            "session_block_height": 2,
            "servicer_pub_key": SERVICER,
            "blockchain": "0001",
            "signature": "",
            "token": {
                "version": "0.0.1",
                "clientPublicKey": "c1c1",
                "applicationPublicKey": "a9a9",
                "applicationSignature": "5151"
            }
        });
        let p = Proof::from_json(&doc.to_string()).unwrap();
        assert_eq!(p.token(), &token());
        assert_eq!(p.entropy(), &BigInt::from(9));
    }

    #[test]
    fn test_from_json_missing_token() {
        let doc = json!({
            "entropy": 9,
            "session_block_height": 2,
            "servicer_pub_key": SERVICER,
            "blockchain": "0001",
        });
        let err = Proof::from_json(&doc.to_string()).unwrap_err();
        assert!(matches!(err, Error::ProofParse(ProofParseError::TokenMissing)));
        assert!(err.to_string().starts_with("Failed to retrieve AAT for Proof with error:"));
    }

    #[test]
    fn test_from_json_malformed() {
        let err = Proof::from_json("{ not json").unwrap_err();
        assert!(matches!(err, Error::ProofParse(ProofParseError::Json(_))));
    }

    #[test]
    fn test_from_json_invalid_fields_are_wrapped() {
        let mut doc = proof().to_json();
        doc["session_block_height"] = json!(0);
        let err = Proof::from_json(&doc.to_string()).unwrap_err();
        match err {
            Error::ProofParse(ProofParseError::Invalid(inner)) => {
                assert!(matches!(*inner, Error::InvalidProof(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_json_non_numeric_entropy() {
        let mut doc = proof().to_json();
        doc["entropy"] = json!("abc");
        assert!(Proof::from_json(&doc.to_string()).is_err());
    }

    #[test]
    fn test_string_numbers_keep_precision() {
        let mut doc = proof().to_json();
        doc["entropy"] = json!("123456789012345678901234567890");
        let p = Proof::from_json(&doc.to_string()).unwrap();
        assert_eq!(p.entropy().to_string(), "123456789012345678901234567890");
    }

    #[test]
    fn test_narrowing_above_safe_integer_range() {
        let big = BigInt::from(9_007_199_254_740_993_i64); // 2^53 + 1
        let p = Proof::new(big, 5, SERVICER, "0021", token(), "").unwrap();
        assert_eq!(p.to_json()["entropy"], json!(9_007_199_254_740_992_i64));

        let huge: BigInt = "100000000000000000000".parse().unwrap();
        let p = Proof::new(huge, 5, SERVICER, "0021", token(), "").unwrap();
        assert_eq!(p.to_json()["entropy"].as_f64(), Some(1e20));
    }

    #[test]
    fn test_rejects_height_beyond_f64_range() {
        let height = num_traits::pow(BigInt::from(10), 400);
        let err = Proof::new(3, height, SERVICER, "0021", token(), "").unwrap_err();
        assert!(err.to_string().contains("session block height"));
    }

    #[test]
    fn test_large_finite_height_round_trips_as_number() {
        let height: BigInt = "100000000000000000000".parse().unwrap();
        let p = Proof::new(3, height, SERVICER, "0021", token(), "").unwrap();
        assert!(p.to_json()["session_block_height"].is_number());
        let parsed = Proof::from_json(&p.to_json_string()).unwrap();
        assert_eq!(parsed.session_block_height(), p.session_block_height());
    }

    #[test]
    fn test_from_json_rejects_non_string_fields() {
        for key in ["signature", "blockchain", "servicer_pub_key"] {
            let mut doc = proof().to_json();
            doc[key] = json!(12345);
            let err = Proof::from_json(&doc.to_string()).unwrap_err();
            assert!(err.to_string().contains(&format!("{} is not a string", key)), "{}", err);
        }

        let mut doc = proof().to_json();
        doc["aat"]["version"] = json!(1);
        let err = Proof::from_json(&doc.to_string()).unwrap_err();
        assert!(err.to_string().contains("version is not a string"), "{}", err);
    }

    #[test]
    fn test_from_json_missing_signature_is_unsigned() {
        let mut doc = proof().to_json();
        doc.as_object_mut().unwrap().remove("signature");
        let p = Proof::from_json(&doc.to_string()).unwrap();
        assert!(!p.is_signed());
    }

    #[test]
    fn test_serialize_matches_to_json() {
        let p = proof();
        assert_eq!(serde_json::to_value(&p).unwrap(), p.to_json());
        assert_eq!(p.to_string(), p.to_json_string());
    }
}
