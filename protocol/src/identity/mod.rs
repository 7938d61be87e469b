//! # Identity Module
//!
//! Self-sovereign identity documents for the SID protocol. Every identity is
//! controlled by a secp256k1 key, and the key's compressed public point is
//! embedded in the identity's `did:sid:` identifier. Anyone holding the
//! document can check its signature with nothing but the document itself.
//!
//! The identity stack is layered:
//!
//! 1. **Wallet** — BIP-39 mnemonic + BIP-32 path to key material. The same
//!    phrase, password and path always yield the same key.
//! 2. **Address** — EIP-55 checksummed Keccak-256 account address.
//! 3. **DID** — `did:sid:<bech32>` identifiers and W3C DID Documents.
//! 4. **Document** — the signed identity record and its per-kind profile
//!    extension (personal, organization, service, application).
//! 5. **Codec** — deterministic binary encoding and the canonical form that
//!    signatures cover.
//! 6. **Lifecycle** — create, sign, verify, update.
//!
//! ## Design Decisions
//!
//! - The profile extension is a sum type, so "exactly one extension is
//!   populated" holds by construction.
//! - Verification never mutates the document. Canonical bytes are produced
//!   from a borrowed view with the signature blanked.
//! - Updates are version-chained copies. The previous version is never
//!   modified.

pub mod address;
pub mod codec;
pub mod did;
pub mod document;
pub mod lifecycle;
pub mod wallet;
pub mod wordlist;

pub use address::{compute_address, is_valid_address, to_checksum_address};
pub use codec::{canonical_bytes, decode, deep_clone, encode, CodecError};
pub use did::{construct_identifier, extract_public_key, DidDocument, DidError, SidDid, VerificationMethod};
pub use document::{
    ApplicationExtend, DocumentState, Identity, IdentityCode, IdentityMetadata, IdentityTemplate,
    OrganizationExtend, PersonalExtend, ProfileExtension, SecurityConfig, ServiceExtend,
    UnknownIdentityCode,
};
pub use lifecycle::{
    create, create_with_clock, populated_extensions, sign, template_from, update,
    update_with_clock, verify, Clock, FixedClock, IdentityError, SystemClock,
};
pub use wallet::{
    derive_from_mnemonic, derive_random, derive_random_with_config, DerivationError, KeyMaterial,
    MnemonicInfo,
};
pub use wordlist::Wordlist;
