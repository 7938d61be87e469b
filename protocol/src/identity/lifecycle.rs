//! # Identity Lifecycle
//!
//! The four operations that move a document through its life:
//!
//! ```text
//! create ──> Unsigned ──sign──> Signed ──verify──> true / false
//!                                  │
//!                                  └──update──> (deep copy, version + 1) ──sign──> Signed
//! ```
//!
//! ## Signing protocol
//!
//! 1. Encode the document with its signature treated as empty
//!    ([`canonical_bytes`]).
//! 2. SHA-256 the bytes.
//! 3. ECDSA-sign the digest (low-S, DER) and store it as hex.
//!
//! Verification repeats steps 1–2 and checks the stored signature against
//! the public key embedded in `metadata.did`. The DID is the only key source
//! consulted; a caller cannot substitute a key of their choosing.
//!
//! ## Ownership
//!
//! `verify` takes `&Identity` and never writes to it, so any number of
//! readers may verify a shared document. `sign` takes `&mut Identity`, which
//! makes exclusive access a compile-time requirement. `update` borrows the
//! previous version immutably and works on a deep copy, so the previous
//! version stays readable while an update is in flight.
//!
//! ## Failure
//!
//! `create` and `update` self-verify before returning. If anything fails
//! along the way, the caller gets an error and no document.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use super::codec::{canonical_bytes, deep_clone, CodecError};
use super::did::{construct_identifier, extract_public_key, DidError};
use super::document::{
    Identity, IdentityCode, IdentityMetadata, IdentityTemplate, ProfileExtension,
    UnknownIdentityCode,
};
use super::wallet::{DerivationError, KeyMaterial};
use crate::config::{DIGEST_ALGORITHM, SIGNING_ALGORITHM};
use crate::crypto::hash::sha256_array;
use crate::crypto::keys::SidKeypair;
use crate::crypto::signatures::{decode_signature_hex, sign_digest, verify_digest, SignatureError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by lifecycle operations. None are retried internally.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The template's code is outside {Personal, Organization, Service, Application}.
    #[error("unsupported identity code: {0}")]
    UnsupportedIdentityCode(u32),

    /// The template's extension variant does not match its code.
    #[error("extension mismatch: code is {code}, extension is {extension}")]
    ExtensionMismatch {
        code: IdentityCode,
        extension: IdentityCode,
    },

    /// The previous identity failed verification, so it cannot be updated.
    #[error("identity {did} failed verification")]
    InvalidIdentity { did: String },

    /// The freshly signed document did not verify: the signing key does not
    /// control the identifier.
    #[error("signing key does not match identifier {did}")]
    KeyMismatch { did: String },

    /// Key derivation failed, e.g. a mnemonic with a bad checksum.
    #[error(transparent)]
    Derivation(#[from] DerivationError),

    #[error(transparent)]
    Identifier(#[from] DidError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl From<UnknownIdentityCode> for IdentityError {
    fn from(e: UnknownIdentityCode) -> Self {
        IdentityError::UnsupportedIdentityCode(e.0)
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of `created`/`checkpoint` timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Build, sign and self-verify a new identity, version 0.
///
/// # Example
///
/// ```
/// use sid_protocol::identity::{create, verify, IdentityTemplate, PersonalExtend, ProfileExtension};
/// use sid_protocol::identity::wallet::derive_random;
/// use sid_protocol::identity::Wordlist;
///
/// let key = derive_random("", "m/44'/60'/0'/0/0", Wordlist::English).unwrap();
/// let template = IdentityTemplate::new(
///     "alice",
///     ProfileExtension::Personal(PersonalExtend::default()),
/// );
/// let identity = create(&key, vec![], &template).unwrap();
/// assert_eq!(identity.metadata.version, 0);
/// assert!(verify(&identity).unwrap());
/// ```
pub fn create(
    key: &KeyMaterial,
    block_address: Vec<u8>,
    template: &IdentityTemplate,
) -> Result<Identity, IdentityError> {
    create_with_clock(key, block_address, template, &SystemClock)
}

/// [`create`] with an explicit time source.
pub fn create_with_clock(
    key: &KeyMaterial,
    block_address: Vec<u8>,
    template: &IdentityTemplate,
    clock: &dyn Clock,
) -> Result<Identity, IdentityError> {
    let code = validate_template(template)?;
    let did = construct_identifier(template.network, key.public_key())?;
    let now = clock.now();

    let mut identity = Identity {
        block_address,
        metadata: IdentityMetadata {
            network: template.network,
            did,
            address: key.address().to_string(),
            name: template.name.clone(),
            description: template.description.clone(),
            parent: template.parent.clone(),
            code,
            avatar: template.avatar.clone(),
            version: 0,
            created: now,
            checkpoint: now,
        },
        security_config: template.security_config.clone(),
        extend: template.extend.clone(),
        signature: String::new(),
    };

    sign_and_check(&mut identity, key.keypair())?;
    debug!(did = %identity.metadata.did, code = %code, "identity created");
    Ok(identity)
}

/// Compute the signature over the canonical bytes and embed it.
///
/// Any previous signature is replaced. Signing the same fields with the same
/// key twice yields the same signature. On error the document is unchanged.
pub fn sign(identity: &mut Identity, keypair: &SidKeypair) -> Result<(), IdentityError> {
    let digest = sha256_array(&canonical_bytes(identity)?);
    let signature = sign_digest(keypair, &digest)?;
    identity.signature = signature.to_hex();
    debug!(
        did = %identity.metadata.did,
        algorithm = SIGNING_ALGORITHM,
        digest = DIGEST_ALGORITHM,
        "document signed"
    );
    Ok(())
}

/// Check the embedded signature against the key inside `metadata.did`.
///
/// Returns `Ok(false)` for an unsigned document or a signature that does not
/// match. Returns an error only when the DID or the signature cannot be
/// parsed at all. The document is never modified.
pub fn verify(identity: &Identity) -> Result<bool, IdentityError> {
    let public_key = extract_public_key(&identity.metadata.did)?;

    if identity.signature.is_empty() {
        debug!(did = %identity.metadata.did, "verify: document is unsigned");
        return Ok(false);
    }

    let der = decode_signature_hex(&identity.signature)?;
    let digest = sha256_array(&canonical_bytes(identity)?);
    let valid = verify_digest(&public_key, &digest, &der)?;

    if !valid {
        warn!(did = %identity.metadata.did, version = identity.metadata.version, "signature rejected");
    }
    Ok(valid)
}

/// Produce the next version of a verified identity.
///
/// The previous identity is only read. The result is a deep copy with the
/// template's descriptive fields, `version + 1`, a fresh checkpoint, and a
/// new signature from `key`. `created`, `network`, `did`, `address` and
/// `block_address` carry over unchanged.
pub fn update(
    template: &IdentityTemplate,
    previous: &Identity,
    key: &KeyMaterial,
) -> Result<Identity, IdentityError> {
    update_with_clock(template, previous, key, &SystemClock)
}

/// [`update`] with an explicit time source.
pub fn update_with_clock(
    template: &IdentityTemplate,
    previous: &Identity,
    key: &KeyMaterial,
    clock: &dyn Clock,
) -> Result<Identity, IdentityError> {
    if !verify(previous)? {
        return Err(IdentityError::InvalidIdentity {
            did: previous.metadata.did.clone(),
        });
    }
    let code = validate_template(template)?;

    let mut next = deep_clone(previous)?;
    next.metadata.name = template.name.clone();
    next.metadata.description = template.description.clone();
    next.metadata.parent = template.parent.clone();
    next.metadata.code = code;
    next.metadata.avatar = template.avatar.clone();
    next.metadata.version += 1;
    next.metadata.checkpoint = clock.now();
    next.security_config = template.security_config.clone();
    next.extend = template.extend.clone();

    sign_and_check(&mut next, key.keypair())?;
    debug!(
        did = %next.metadata.did,
        version = next.metadata.version,
        "identity updated"
    );
    Ok(next)
}

fn validate_template(template: &IdentityTemplate) -> Result<IdentityCode, IdentityError> {
    let code = IdentityCode::try_from(template.code)?;
    let extension = template.extend.code();
    if extension != code {
        return Err(IdentityError::ExtensionMismatch { code, extension });
    }
    Ok(code)
}

fn sign_and_check(identity: &mut Identity, keypair: &SidKeypair) -> Result<(), IdentityError> {
    sign(identity, keypair)?;
    if !verify(identity)? {
        warn!(did = %identity.metadata.did, "self-verification failed after signing");
        return Err(IdentityError::KeyMismatch {
            did: identity.metadata.did.clone(),
        });
    }
    Ok(())
}

/// Convenience for building a template that keeps everything from `identity`
/// except what the caller then changes.
pub fn template_from(identity: &Identity) -> IdentityTemplate {
    IdentityTemplate {
        network: identity.metadata.network,
        name: identity.metadata.name.clone(),
        description: identity.metadata.description.clone(),
        parent: identity.metadata.parent.clone(),
        code: identity.metadata.code.as_u32(),
        avatar: identity.metadata.avatar.clone(),
        security_config: identity.security_config.clone(),
        extend: identity.extend.clone(),
    }
}

/// Variant exclusivity as seen from the outside: exactly one of the four
/// extension accessors is populated.
pub fn populated_extensions(extend: &ProfileExtension) -> usize {
    [
        extend.as_personal().is_some(),
        extend.as_organization().is_some(),
        extend.as_service().is_some(),
        extend.as_application().is_some(),
    ]
    .iter()
    .filter(|populated| **populated)
    .count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
