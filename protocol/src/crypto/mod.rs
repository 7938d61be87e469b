//! # Cryptographic Primitives for SID
//!
//! Everything security-related in the protocol bottoms out here: key
//! handling, digests, and the signature engine that identity documents are
//! signed and verified with.
//!
//! - **secp256k1 ECDSA** (`k256`) for signatures, low-S, DER-encoded.
//! - **SHA-256** for document digests.
//! - **Keccak-256** for account addresses.
//!
//! Everything here is a thin, type-safe wrapper around audited
//! implementations. No curve arithmetic lives in this crate.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{keccak256, sha256, sha256_array, DocumentDigest};
pub use keys::{KeyError, SidKeypair, SidPublicKey, SidSignature};
pub use signatures::{
    sign_data, sign_digest, sign_hash_bytes, verify_data, verify_digest, verify_hash_bytes,
    SignatureError,
};
