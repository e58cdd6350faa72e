//! The key algorithms supported by the signer/verifier suite.

use serde::{Deserialize, Serialize};

/// A cryptographic key algorithm recognized by the multicodec codec.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Ed25519 (EdDSA).
    #[default]
    Ed25519,

    /// secp256k1 (ECDSA over SHA-256).
    Secp256k1,

    /// NIST P-256 (ECDSA over SHA-256).
    P256,

    /// BLS12-381 G2.
    Bls12381G2,
}

impl Algorithm {
    /// Name used in error messages and config keys (`defaultKeyType`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ed25519 => "Ed25519",
            Self::Secp256k1 => "ES256K",
            Self::P256 => "ES256",
            Self::Bls12381G2 => "Bls12381G2",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
