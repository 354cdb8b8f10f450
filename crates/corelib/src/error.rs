//! Error types for the core library.

use thiserror::Error;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
#[derive(Debug, Error)]
pub enum Error {
    /// Proof fields failed validation at construction.
    #[error("Invalid Proof properties: {0}")]
    InvalidProof(String),
    /// Application Authentication Token failed validation.
    #[error("Invalid AAT properties: {0}")]
    InvalidToken(String),
    /// A proof document could not be turned into a `Proof`.
    #[error("Failed to retrieve AAT for Proof with error: {0}")]
    ProofParse(#[from] ProofParseError),
    /// Relay dispatch failed (non-200, null body, transport or decode error).
    #[error("Failed to send relay with error: {0}")]
    RelayDispatch(String),
    /// Configuration could not be read or decoded.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn dispatch(detail: impl std::fmt::Display) -> Self {
        Error::RelayDispatch(detail.to_string())
    }
}

/// Underlying cause of a [`Error::ProofParse`].
///
/// Callers that only care about "the proof was unusable" can match on
/// `Error::ProofParse(_)`; the variant here tells them why.
#[derive(Debug, Error)]
pub enum ProofParseError {
    /// The document carries neither a `token` nor an `aat` object.
    #[error("Failed to retrieve AAT, property is undefined")]
    TokenMissing,
    /// The input is not a JSON document.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// The document parsed but its fields do not form a valid proof.
    #[error("{0}")]
    Invalid(Box<Error>),
}

impl From<Error> for ProofParseError {
    fn from(err: Error) -> Self {
        ProofParseError::Invalid(Box::new(err))
    }
}
