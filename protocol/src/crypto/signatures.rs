//! # Digital Signatures
//!
//! ECDSA over secp256k1 — how an identity document proves who wrote it.
//!
//! The engine works on 32-byte digests, never on raw messages: callers hash
//! first (SHA-256 for documents) and hand the digest here. That keeps the
//! document protocol in charge of *what* gets signed and this module in
//! charge of *how*.
//!
//! ## Canonical form
//!
//! ECDSA has a malleability wart: if `(r, s)` verifies, so does `(r, n - s)`.
//! Two encodings of one signature means a document can change bytes without
//! changing validity. We close that door on both ends:
//!
//! 1. Signing always emits the low-S form.
//! 2. Verification treats a high-S signature as invalid.
//!
//! Signatures travel DER-encoded. Nonces are RFC 6979 deterministic, so the
//! same key over the same digest always yields the same bytes.
//!
//! ## Raw-hex helpers
//!
//! [`sign_data`], [`verify_data`], [`sign_hash_bytes`] and
//! [`verify_hash_bytes`] take hex keys and arbitrary payloads for callers
//! that need to sign something that isn't an identity document with the
//! same key material.

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::Signature;
use thiserror::Error;

use super::hash::{digest_from_slice, sha256_array, DocumentDigest};
use super::keys::{KeyError, SidKeypair, SidPublicKey, SidSignature};
use crate::config::{DIGEST_LENGTH, MAX_DER_SIGNATURE_LENGTH};

/// Errors during signature operations.
///
/// A signature that parses but doesn't match is *not* an error — it's a
/// `false`. These variants are reserved for inputs that can't be parsed at all.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// The key could not be decoded (bad hex, wrong length, off-curve).
    #[error("malformed key: {0}")]
    MalformedKey(#[from] KeyError),

    /// The signature is not valid hex or not valid DER.
    #[error("malformed signature: {reason}")]
    MalformedSignature { reason: String },

    /// A pre-hashed payload was not exactly one digest long.
    #[error("invalid digest length: expected {expected} bytes, got {got}")]
    InvalidDigestLength { expected: usize, got: usize },

    /// The underlying ECDSA implementation refused to sign.
    #[error("signing failed")]
    SigningFailed,
}

/// Sign a digest with the given keypair.
///
/// Produces a DER-encoded, low-S ECDSA signature.
///
/// # Example
///
/// ```
/// use sid_protocol::crypto::{sha256_array, SidKeypair};
/// use sid_protocol::crypto::signatures::{sign_digest, verify_digest};
///
/// let kp = SidKeypair::generate();
/// let digest = sha256_array(b"hello");
/// let sig = sign_digest(&kp, &digest).unwrap();
/// assert!(verify_digest(&kp.public_key(), &digest, sig.as_bytes()).unwrap());
/// ```
pub fn sign_digest(
    keypair: &SidKeypair,
    digest: &DocumentDigest,
) -> Result<SidSignature, SignatureError> {
    let signature: Signature = keypair
        .signing_key()
        .sign_prehash(digest)
        .map_err(|_| SignatureError::SigningFailed)?;
    // k256 already emits low-S, but the guarantee belongs to us, not to a
    // dependency's current default.
    let signature = signature.normalize_s().unwrap_or(signature);
    Ok(SidSignature::from_der(signature.to_der().as_bytes().to_vec()))
}

/// Verify a DER signature over a digest.
///
/// Returns `Ok(false)` for a well-formed signature that doesn't match, and
/// for high-S signatures. Returns `Err(MalformedSignature)` when the bytes
/// are not DER.
pub fn verify_digest(
    public_key: &SidPublicKey,
    digest: &DocumentDigest,
    der: &[u8],
) -> Result<bool, SignatureError> {
    let signature = Signature::from_der(der).map_err(|e| SignatureError::MalformedSignature {
        reason: e.to_string(),
    })?;

    if signature.normalize_s().is_some() {
        return Ok(false);
    }

    let verifying_key = public_key.to_verifying_key()?;
    Ok(verifying_key.verify_prehash(digest, &signature).is_ok())
}

/// Hash `data` with SHA-256 and sign it with a hex-encoded private key.
///
/// Returns the hex-encoded DER signature.
pub fn sign_data(data: &[u8], private_key_hex: &str) -> Result<String, SignatureError> {
    let keypair = SidKeypair::from_hex(private_key_hex)?;
    let signature = sign_digest(&keypair, &sha256_array(data))?;
    Ok(signature.to_hex())
}

/// Verify a hex signature produced by [`sign_data`].
pub fn verify_data(
    data: &[u8],
    signature_hex: &str,
    public_key_hex: &str,
) -> Result<bool, SignatureError> {
    let public_key = SidPublicKey::from_hex(public_key_hex)?;
    let der = decode_signature_hex(signature_hex)?;
    verify_digest(&public_key, &sha256_array(data), &der)
}

/// Sign an already-computed 32-byte hash with a hex-encoded private key.
pub fn sign_hash_bytes(hash: &[u8], private_key_hex: &str) -> Result<String, SignatureError> {
    let digest = to_digest(hash)?;
    let keypair = SidKeypair::from_hex(private_key_hex)?;
    Ok(sign_digest(&keypair, &digest)?.to_hex())
}

/// Verify a hex signature over an already-computed 32-byte hash.
pub fn verify_hash_bytes(
    hash: &[u8],
    signature_hex: &str,
    public_key_hex: &str,
) -> Result<bool, SignatureError> {
    let digest = to_digest(hash)?;
    let public_key = SidPublicKey::from_hex(public_key_hex)?;
    let der = decode_signature_hex(signature_hex)?;
    verify_digest(&public_key, &digest, &der)
}

fn to_digest(hash: &[u8]) -> Result<DocumentDigest, SignatureError> {
    digest_from_slice(hash).ok_or(SignatureError::InvalidDigestLength {
        expected: DIGEST_LENGTH,
        got: hash.len(),
    })
}

/// Decode the hex form of a DER signature as embedded in documents.
///
/// Only lowercase hex is accepted: one signature has exactly one string
/// form, so rewriting its case changes the document's bytes and must not
/// keep it valid.
pub(crate) fn decode_signature_hex(signature_hex: &str) -> Result<Vec<u8>, SignatureError> {
    let der = hex::decode(signature_hex).map_err(|e| SignatureError::MalformedSignature {
        reason: e.to_string(),
    })?;
    if der.len() > MAX_DER_SIGNATURE_LENGTH {
        return Err(SignatureError::MalformedSignature {
            reason: format!(
                "{} bytes exceeds the {}-byte DER bound",
                der.len(),
                MAX_DER_SIGNATURE_LENGTH
            ),
        });
    }
    if hex::encode(&der) != signature_hex {
        return Err(SignatureError::MalformedSignature {
            reason: "signature hex must be lowercase".into(),
        });
    }
    Ok(der)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
