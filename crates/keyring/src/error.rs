//! Error types for key encoding and signing.

use thiserror::Error;

/// Errors returned by the multicodec codec and the signer/verifier suite.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The multibase string did not start with the `z` (base58btc) prefix.
    #[error("invalid multibase encoding: {0}")]
    InvalidEncoding(String),

    /// The decoded base58 body did not parse.
    #[error("invalid base58 payload: {0}")]
    InvalidBase58(String),

    /// The multicodec header did not match a known key type.
    #[error("unsupported key type header: {0}")]
    UnsupportedKeyType(String),

    /// A signer was asked to operate on a key of a different algorithm.
    #[error("key algorithm {actual} does not match signer algorithm {expected}")]
    WrongKeyType {
        /// Algorithm the signer expects.
        expected: &'static str,
        /// Algorithm embedded in the supplied key.
        actual: String,
    },

    /// Signing failed at the underlying curve primitive.
    #[error("signing failed: {0}")]
    SigningFailed(String),
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
