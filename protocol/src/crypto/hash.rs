//! # Hashing Utilities
//!
//! Two hash functions, two jobs:
//!
//! - **SHA-256** digests canonical document bytes before they are signed.
//!   Every verifier in every language has it, which is the whole point of
//!   a signature format.
//!
//! - **Keccak-256** derives account addresses from public keys. It is the
//!   pre-standard Keccak padding, *not* NIST SHA3-256; Ethereum froze on the
//!   former and we have to match it byte for byte.

use sha2::{Digest, Sha256};
use sha3::Keccak256;

use crate::config::DIGEST_LENGTH;

/// A fixed-size digest over canonical bytes.
pub type DocumentDigest = [u8; DIGEST_LENGTH];

/// Compute the SHA-256 hash of the input data as a `Vec<u8>`.
///
/// # Example
///
/// ```
/// use sid_protocol::crypto::sha256;
///
/// let hash = sha256(b"SID protocol");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Vec<u8> {
    sha256_array(data).to_vec()
}

/// Compute the SHA-256 hash and return a fixed-size array.
///
/// This is the digest the signature engine signs over.
pub fn sha256_array(data: &[u8]) -> DocumentDigest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute the Keccak-256 hash of the input data.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Interpret an arbitrary slice as a document digest.
///
/// Returns `None` unless the slice is exactly [`DIGEST_LENGTH`] bytes.
pub fn digest_from_slice(bytes: &[u8]) -> Option<DocumentDigest> {
    bytes.try_into().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
