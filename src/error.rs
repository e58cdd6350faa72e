//! # Errors
//!
//! A single taxonomy realized as one `thiserror` enum per crate.
//! Cryptographic `verify` operations never construct this type for a failed
//! verification — they return `bool` directly (see [`crate::proof`] and
//! [`originals_keyring`]).

use thiserror::Error;

/// Errors returned by the Originals SDK.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or ill-formed argument: bad MIME, bad hex, empty resource
    /// list, invalid DID, etc.
    #[error("invalid input: {0}")]
    Input(String),

    /// Invalid multibase prefix or unsupported multicodec key type header.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Wrong key type for a signer, bad signature, hash mismatch.
    #[error("cryptographic error: {0}")]
    Cryptographic(String),

    /// Version-chain break or content-hash mismatch against cached/persisted
    /// data.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// Missing resource, inscription, or checkpoint.
    #[error("not found: {0}")]
    NotFound(String),

    /// Disallowed layer or state transition.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// HTTP/RPC failure, timeout, or storage unavailable.
    #[error("external error: {0}")]
    External(String),

    /// Requested media type not supported (BTCO URL dereferencing).
    #[error("representation not supported: {0}")]
    Representation(String),

    /// Rollback failed after a migration failure.
    #[error("quarantined: {0}")]
    Quarantine(String),
}

impl Error {
    /// Construct a timeout-flavored [`Error::External`].
    #[must_use]
    pub fn timeout(operation: &str, millis: u64) -> Self {
        Self::External(format!("{operation} timed out after {millis}ms"))
    }
}

impl From<originals_keyring::Error> for Error {
    fn from(err: originals_keyring::Error) -> Self {
        match err {
            originals_keyring::Error::InvalidEncoding(_)
            | originals_keyring::Error::InvalidBase58(_)
            | originals_keyring::Error::UnsupportedKeyType(_) => Self::Encoding(err.to_string()),
            originals_keyring::Error::WrongKeyType { .. }
            | originals_keyring::Error::SigningFailed(_) => Self::Cryptographic(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Input(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::Input(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::External(err.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Self::Input(err.to_string())
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
