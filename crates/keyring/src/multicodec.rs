//! # Multibase / Multicodec codec
//!
//! Encodes byte strings with a two-byte multicodec header, base58btc-encodes
//! the result, and prefixes the output with `z`. Decoding reverses the
//! process and identifies the key algorithm (and public/private role) from
//! the header.

use multibase::Base;

use crate::algorithm::Algorithm;
use crate::error::{Error, Result};

/// Multicodec header for an Ed25519 public key.
pub const ED25519_PUB: [u8; 2] = [0xed, 0x01];
/// Multicodec header for an Ed25519 private key.
pub const ED25519_PRIV: [u8; 2] = [0x13, 0x00];
/// Multicodec header for a compressed secp256k1 public key.
pub const SECP256K1_PUB: [u8; 2] = [0xe7, 0x01];
/// Multicodec header for a secp256k1 private key.
pub const SECP256K1_PRIV: [u8; 2] = [0x13, 0x01];
/// Multicodec header for a compressed P-256 public key.
pub const P256_PUB: [u8; 2] = [0x80, 0x24];
/// Multicodec header for a P-256 private key.
pub const P256_PRIV: [u8; 2] = [0x13, 0x06];
/// Multicodec header for a BLS12-381 G2 public key.
pub const BLS12381_G2_PUB: [u8; 2] = [0xeb, 0x01];
/// Multicodec header for a BLS12-381 G2 private key.
pub const BLS12381_G2_PRIV: [u8; 2] = [0x13, 0x0a];

/// Whether a decoded multicodec key is public or private key material.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyRole {
    /// Public key material, safe to publish in a DID document.
    Public,
    /// Private key material, never published.
    Private,
}

/// The result of decoding a multicodec-tagged multibase string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedKey {
    /// The key's algorithm, inferred from the multicodec header.
    pub algorithm: Algorithm,
    /// Whether the header marks this as public or private key material.
    pub role: KeyRole,
    /// The raw key bytes, header stripped.
    pub bytes: Vec<u8>,
}

fn header_for(algorithm: Algorithm, role: KeyRole) -> [u8; 2] {
    match (algorithm, role) {
        (Algorithm::Ed25519, KeyRole::Public) => ED25519_PUB,
        (Algorithm::Ed25519, KeyRole::Private) => ED25519_PRIV,
        (Algorithm::Secp256k1, KeyRole::Public) => SECP256K1_PUB,
        (Algorithm::Secp256k1, KeyRole::Private) => SECP256K1_PRIV,
        (Algorithm::P256, KeyRole::Public) => P256_PUB,
        (Algorithm::P256, KeyRole::Private) => P256_PRIV,
        (Algorithm::Bls12381G2, KeyRole::Public) => BLS12381_G2_PUB,
        (Algorithm::Bls12381G2, KeyRole::Private) => BLS12381_G2_PRIV,
    }
}

fn algorithm_for(header: [u8; 2]) -> Option<(Algorithm, KeyRole)> {
    match header {
        ED25519_PUB => Some((Algorithm::Ed25519, KeyRole::Public)),
        ED25519_PRIV => Some((Algorithm::Ed25519, KeyRole::Private)),
        SECP256K1_PUB => Some((Algorithm::Secp256k1, KeyRole::Public)),
        SECP256K1_PRIV => Some((Algorithm::Secp256k1, KeyRole::Private)),
        P256_PUB => Some((Algorithm::P256, KeyRole::Public)),
        P256_PRIV => Some((Algorithm::P256, KeyRole::Private)),
        BLS12381_G2_PUB => Some((Algorithm::Bls12381G2, KeyRole::Public)),
        BLS12381_G2_PRIV => Some((Algorithm::Bls12381G2, KeyRole::Private)),
        _ => None,
    }
}

/// Encode key bytes with their multicodec header as a `z`-prefixed multibase
/// string.
#[must_use]
pub fn encode_key(algorithm: Algorithm, role: KeyRole, key_bytes: &[u8]) -> String {
    let header = header_for(algorithm, role);
    let mut tagged = Vec::with_capacity(2 + key_bytes.len());
    tagged.extend_from_slice(&header);
    tagged.extend_from_slice(key_bytes);
    multibase::encode(Base::Base58Btc, tagged)
}

/// Decode a `z`-prefixed multibase key string, recovering its algorithm, role
/// and raw bytes.
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`] if the string does not start with `z`,
/// [`Error::InvalidBase58`] if the base58 body is malformed, or
/// [`Error::UnsupportedKeyType`] if the multicodec header is unrecognized.
pub fn decode_key(multibase_str: &str) -> Result<DecodedKey> {
    if !multibase_str.starts_with('z') {
        return Err(Error::InvalidEncoding(multibase_str.to_string()));
    }
    let (base, bytes) = multibase::decode(multibase_str)
        .map_err(|e| Error::InvalidBase58(e.to_string()))?;
    if base != Base::Base58Btc {
        return Err(Error::InvalidEncoding(multibase_str.to_string()));
    }
    if bytes.len() < 2 {
        return Err(Error::InvalidBase58("payload shorter than multicodec header".into()));
    }
    let header = [bytes[0], bytes[1]];
    let Some((algorithm, role)) = algorithm_for(header) else {
        return Err(Error::UnsupportedKeyType(format!("{header:02x?}")));
    };
    Ok(DecodedKey { algorithm, role, bytes: bytes[2..].to_vec() })
}

/// Encode a bare payload (signature or other opaque bytes) as multibase
/// base58btc, with no multicodec header.
#[must_use]
pub fn encode_bare(payload: &[u8]) -> String {
    multibase::encode(Base::Base58Btc, payload)
}

/// Decode a bare multibase base58btc payload (no multicodec header).
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`] if the string is not `z`-prefixed
/// base58btc, or [`Error::InvalidBase58`] if the body cannot be decoded.
pub fn decode_bare(multibase_str: &str) -> Result<Vec<u8>> {
    if !multibase_str.starts_with('z') {
        return Err(Error::InvalidEncoding(multibase_str.to_string()));
    }
    let (base, bytes) =
        multibase::decode(multibase_str).map_err(|e| Error::InvalidBase58(e.to_string()))?;
    if base != Base::Base58Btc {
        return Err(Error::InvalidEncoding(multibase_str.to_string()));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_algorithm() {
        for algorithm in
            [Algorithm::Ed25519, Algorithm::Secp256k1, Algorithm::P256, Algorithm::Bls12381G2]
        {
            for role in [KeyRole::Public, KeyRole::Private] {
                let bytes = vec![7u8; 32];
                let encoded = encode_key(algorithm, role, &bytes);
                assert!(encoded.starts_with('z'));
                let decoded = decode_key(&encoded).expect("should decode");
                assert_eq!(decoded.algorithm, algorithm);
                assert_eq!(decoded.role, role);
                assert_eq!(decoded.bytes, bytes);
            }
        }
    }

    #[test]
    fn rejects_missing_z_prefix() {
        let err = decode_key("abcdef").unwrap_err();
        assert!(matches!(err, Error::InvalidEncoding(_)));
    }

    #[test]
    fn rejects_unknown_header() {
        let tagged = [[0xff, 0xff].as_slice(), &[1, 2, 3]].concat();
        let encoded = multibase::encode(Base::Base58Btc, tagged);
        let err = decode_key(&encoded).unwrap_err();
        assert!(matches!(err, Error::UnsupportedKeyType(_)));
    }

    #[test]
    fn bare_payload_round_trips() {
        let payload = b"some signature bytes";
        let encoded = encode_bare(payload);
        let decoded = decode_bare(&encoded).expect("should decode");
        assert_eq!(decoded, payload);
    }
}
