//! Sui signature recovery for unexecuted transactions.
//!
//! A serialized Sui signature is `flag || signature || public_key`, base64
//! encoded. The signed message is the Blake2b-256 digest of the transaction
//! intent message (`[0, 0, 0] || tx_bytes`), and the signer's address is
//! Blake2b-256(`flag || public_key`).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use thiserror::Error;
use tracing::debug;

type Blake2b256 = Blake2b<U32>;

/// Intent prefix for transaction data: scope 0, version 0, app id Sui.
pub const TRANSACTION_INTENT: [u8; 3] = [0, 0, 0];

/// Raw signature size for both supported schemes.
pub const SIGNATURE_SIZE: usize = 64;

/// Errors produced while recovering a signer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// Not valid base64.
    #[error("Invalid signature encoding: {0}")]
    Encoding(String),

    /// Zero-length signature.
    #[error("Empty signature")]
    Empty,

    /// The scheme flag is not one this verifier handles.
    #[error("Unsupported signature scheme flag {0:#04x}")]
    UnsupportedScheme(u8),

    /// Wrong serialized length for the scheme.
    #[error("Invalid signature size for {scheme}: expected {expected}, got {got}")]
    Length {
        /// Scheme named by the flag.
        scheme: SignatureScheme,
        /// Expected serialized length including the flag.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// The embedded public key is not a valid curve point.
    #[error("Invalid public key: {0}")]
    PublicKey(String),

    /// The signature does not verify against the transaction.
    #[error("Invalid signature")]
    Invalid,
}

/// Signature schemes recognized by flag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    /// Pure Ed25519.
    Ed25519,
    /// ECDSA over secp256k1 with SHA-256.
    Secp256k1,
}

impl SignatureScheme {
    /// Flag byte prefixing serialized signatures.
    #[must_use]
    pub const fn flag(self) -> u8 {
        match self {
            Self::Ed25519 => 0x00,
            Self::Secp256k1 => 0x01,
        }
    }

    /// Public key length in bytes.
    #[must_use]
    pub const fn public_key_size(self) -> usize {
        match self {
            Self::Ed25519 => 32,
            Self::Secp256k1 => 33,
        }
    }

    /// Total serialized length: flag, signature and public key.
    #[must_use]
    pub const fn serialized_size(self) -> usize {
        1 + SIGNATURE_SIZE + self.public_key_size()
    }

    fn from_flag(flag: u8) -> Result<Self, SignatureError> {
        match flag {
            0x00 => Ok(Self::Ed25519),
            0x01 => Ok(Self::Secp256k1),
            // Secp256r1, multisig, zkLogin, passkey
            other => Err(SignatureError::UnsupportedScheme(other)),
        }
    }
}

impl std::fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ed25519 => f.write_str("ed25519"),
            Self::Secp256k1 => f.write_str("secp256k1"),
        }
    }
}

/// Recover the address that signed `tx_bytes`.
///
/// # Arguments
///
/// * `tx_bytes` - BCS transaction data, as signed
/// * `serialized_signature` - Base64 `flag || signature || public_key`
///
/// # Errors
///
/// Returns an error if:
/// - The signature is not base64 or is empty
/// - The scheme flag is not Ed25519 or Secp256k1
/// - The length does not match the scheme
/// - The public key is invalid
/// - The signature does not verify over the transaction intent digest
pub fn recover_signer(tx_bytes: &[u8], serialized_signature: &str) -> Result<String, SignatureError> {
    let raw = BASE64
        .decode(serialized_signature.trim())
        .map_err(|e| SignatureError::Encoding(e.to_string()))?;

    let (&flag, rest) = raw.split_first().ok_or(SignatureError::Empty)?;
    let scheme = SignatureScheme::from_flag(flag)?;

    if raw.len() != scheme.serialized_size() {
        return Err(SignatureError::Length {
            scheme,
            expected: scheme.serialized_size(),
            got: raw.len(),
        });
    }

    let (signature, public_key) = rest.split_at(SIGNATURE_SIZE);
    let digest = transaction_digest(tx_bytes);

    match scheme {
        SignatureScheme::Ed25519 => verify_ed25519(&digest, signature, public_key)?,
        SignatureScheme::Secp256k1 => verify_secp256k1(&digest, signature, public_key)?,
    }

    let address = derive_address(scheme, public_key);
    debug!("Recovered {scheme} signer {address}");
    Ok(address)
}

/// Blake2b-256 of the transaction intent message.
#[must_use]
pub fn transaction_digest(tx_bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(TRANSACTION_INTENT);
    hasher.update(tx_bytes);
    finalize(hasher)
}

/// Sui address of a public key: Blake2b-256(`flag || public_key`).
#[must_use]
pub fn derive_address(scheme: SignatureScheme, public_key: &[u8]) -> String {
    let mut hasher = Blake2b256::new();
    hasher.update([scheme.flag()]);
    hasher.update(public_key);
    format!("0x{}", hex::encode(finalize(hasher)))
}

fn finalize(hasher: Blake2b256) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

fn verify_ed25519(digest: &[u8], signature: &[u8], public_key: &[u8]) -> Result<(), SignatureError> {
    let key_bytes: [u8; 32] = public_key
        .try_into()
        .map_err(|_| SignatureError::PublicKey("ed25519 key must be 32 bytes".to_string()))?;
    let sig_bytes: [u8; SIGNATURE_SIZE] = signature
        .try_into()
        .map_err(|_| SignatureError::Invalid)?;

    let key = ed25519_dalek::VerifyingKey::from_bytes(&key_bytes)
        .map_err(|e| SignatureError::PublicKey(e.to_string()))?;
    let sig = ed25519_dalek::Signature::from_bytes(&sig_bytes);

    key.verify_strict(digest, &sig)
        .map_err(|_| SignatureError::Invalid)
}

fn verify_secp256k1(digest: &[u8], signature: &[u8], public_key: &[u8]) -> Result<(), SignatureError> {
    use k256::ecdsa::signature::Verifier;

    let key = k256::ecdsa::VerifyingKey::from_sec1_bytes(public_key)
        .map_err(|e| SignatureError::PublicKey(e.to_string()))?;
    let sig = k256::ecdsa::Signature::from_slice(signature).map_err(|_| SignatureError::Invalid)?;

    // Sui only accepts the low-s form.
    if sig.normalize_s().is_some() {
        return Err(SignatureError::Invalid);
    }

    key.verify(digest, &sig).map_err(|_| SignatureError::Invalid)
}
