//! # Key Management
//!
//! secp256k1 keypair handling for SID identities.
//!
//! Every identity is controlled by exactly one secp256k1 keypair — the same
//! kind of key an EVM wallet holds, so an existing wallet mnemonic can
//! double as an identity root. This module wraps `k256` so the rest of the
//! crate never touches curve types directly.
//!
//! ## Security considerations
//!
//! - `k256::ecdsa::SigningKey` zeroizes its scalar on drop.
//! - Fresh keys come from `OsRng`.
//! - Key bytes are never logged, and [`SidKeypair`]'s `Debug` prints only
//!   the public half.

use k256::ecdsa::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

use super::signatures::{decode_signature_hex, SignatureError};
use crate::config::{
    COMPRESSED_PUBLIC_KEY_LENGTH, PRIVATE_KEY_LENGTH, UNCOMPRESSED_PUBLIC_KEY_LENGTH,
};

/// Errors that can occur during key operations.
///
/// Deliberately vague about *why* a key was rejected; error strings end up in
/// logs and we don't want key fragments to follow them there.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid private key: wrong length, bad hex, or not a valid scalar")]
    InvalidPrivateKey,

    #[error("invalid public key: not a valid SEC1-encoded secp256k1 point")]
    InvalidPublicKey,
}

/// A secp256k1 keypair controlling one identity.
///
/// `SidKeypair` intentionally does NOT implement `Serialize`/`Deserialize`.
/// Exporting a private key should be an explicit call to
/// [`to_bytes`](Self::to_bytes) or [`to_hex`](Self::to_hex).
///
/// # Examples
///
/// ```
/// use sid_protocol::crypto::keys::SidKeypair;
///
/// let kp = SidKeypair::generate();
/// let restored = SidKeypair::from_hex(&kp.to_hex()).unwrap();
/// assert_eq!(kp.public_key(), restored.public_key());
/// ```
#[derive(Clone)]
pub struct SidKeypair {
    signing_key: SigningKey,
}

/// The public half of an identity keypair, held as a compressed SEC1 point.
///
/// Construction always validates that the bytes decode to a point on the
/// curve, so holding a `SidPublicKey` means holding a usable key.
///
/// No serde impl; construct through [`from_sec1_bytes`](Self::from_sec1_bytes)
/// or [`from_hex`](Self::from_hex).
#[derive(Clone, PartialEq, Eq)]
pub struct SidPublicKey {
    bytes: Vec<u8>,
}

/// A DER-encoded, low-S ECDSA signature.
///
/// This type is only a byte container; whether the bytes parse as DER is
/// checked at verification time so that a malformed signature can be
/// reported as such instead of being silently dropped at construction.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidSignature {
    der: Vec<u8>,
}

// ---------------------------------------------------------------------------
// SidKeypair
// ---------------------------------------------------------------------------

impl SidKeypair {
    /// Generate a fresh keypair from the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Wrap an already-constructed `k256` signing key. Used by HD derivation.
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        Self { signing_key }
    }

    /// Reconstruct a keypair from a raw 32-byte scalar.
    ///
    /// Fails for zero and for values at or above the curve order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != PRIVATE_KEY_LENGTH {
            return Err(KeyError::InvalidPrivateKey);
        }
        let signing_key = SigningKey::from_slice(bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Reconstruct a keypair from a hex-encoded scalar. A `0x` prefix is accepted.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let trimmed = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(trimmed).map_err(|_| KeyError::InvalidPrivateKey)?;
        Self::from_bytes(&bytes)
    }

    /// Returns the public key associated with this keypair.
    pub fn public_key(&self) -> SidPublicKey {
        SidPublicKey::from_verifying_key(self.signing_key.verifying_key())
    }

    /// Exports the raw 32-byte secret scalar. Handle with care.
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_LENGTH] {
        self.signing_key.to_bytes().into()
    }

    /// Hex-encoded secret scalar, no `0x` prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Borrow the underlying `k256` signing key.
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for SidKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Secret material never shows up in debug output, not even partially.
        write!(f, "SidKeypair(pub={})", self.public_key().to_hex())
    }
}

impl PartialEq for SidKeypair {
    /// Compares public keys. Comparing secrets outside constant time is a
    /// habit worth not forming.
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for SidKeypair {}

// ---------------------------------------------------------------------------
// SidPublicKey
// ---------------------------------------------------------------------------

impl SidPublicKey {
    fn from_verifying_key(key: &VerifyingKey) -> Self {
        Self {
            bytes: key.to_encoded_point(true).as_bytes().to_vec(),
        }
    }

    /// Parse a SEC1 public key, compressed (33 bytes) or uncompressed (65).
    ///
    /// The key is normalized to compressed form.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != COMPRESSED_PUBLIC_KEY_LENGTH
            && bytes.len() != UNCOMPRESSED_PUBLIC_KEY_LENGTH
        {
            return Err(KeyError::InvalidPublicKey);
        }
        let key = VerifyingKey::from_sec1_bytes(bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self::from_verifying_key(&key))
    }

    /// Parse a hex-encoded SEC1 public key. A `0x` prefix is accepted.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(trimmed).map_err(|_| KeyError::InvalidPublicKey)?;
        Self::from_sec1_bytes(&bytes)
    }

    /// Compressed SEC1 bytes (33 bytes).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Uncompressed SEC1 bytes (65 bytes, leading `0x04`).
    pub fn to_uncompressed(&self) -> Result<Vec<u8>, KeyError> {
        let key = self.to_verifying_key()?;
        Ok(key.to_encoded_point(false).as_bytes().to_vec())
    }

    /// Convert to a `k256` verifying key.
    pub fn to_verifying_key(&self) -> Result<VerifyingKey, KeyError> {
        VerifyingKey::from_sec1_bytes(&self.bytes).map_err(|_| KeyError::InvalidPublicKey)
    }

    /// Hex-encoded compressed key. 66 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl Hash for SidPublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Display for SidPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for SidPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        write!(f, "SidPublicKey({})", hex.get(..16).unwrap_or(&hex))
    }
}

// ---------------------------------------------------------------------------
// SidSignature
// ---------------------------------------------------------------------------

impl SidSignature {
    /// Wrap raw DER bytes.
    pub fn from_der(der: Vec<u8>) -> Self {
        Self { der }
    }

    /// Parse the lowercase-hex form of a DER signature.
    ///
    /// Checks the hex layer, the case and the length bound. Whether the bytes
    /// are valid DER is left to verification.
    pub fn from_hex(s: &str) -> Result<Self, SignatureError> {
        decode_signature_hex(s).map(Self::from_der)
    }

    /// The DER bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.der
    }

    /// Lowercase hex of the DER bytes. This is what gets embedded in documents.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.der)
    }
}

impl fmt::Debug for SidSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        let prefix = &hex[..hex.len().min(16)];
        write!(f, "SidSignature({}...)", prefix)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
