// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # SID Protocol — Core Library
//!
//! Self-sovereign identity documents anchored to wallet keys. A key pair is
//! derived from a BIP-39 mnemonic (or generated at random), an identity
//! document is built around it, and the document is signed so that anyone
//! can check it against the public key embedded in its `did:sid:`
//! identifier.
//!
//! ## Architecture
//!
//! - **config** — Protocol constants, networks, and `IdentityConfig`.
//! - **crypto** — secp256k1 keys, SHA-256/Keccak-256 digests, and the
//!   signature engine. Also exposes raw-payload signing for callers that
//!   need to sign things other than identities.
//! - **identity** — Key derivation, addresses, DIDs, the document model,
//!   the canonical codec, and the create/sign/verify/update lifecycle.
//!
//! ## Design Philosophy
//!
//! 1. A document is accepted only if it is bit-for-bit what was signed.
//! 2. Verification is a read. It never writes to the document.
//! 3. No partially built document ever reaches the caller.
//! 4. No unsafe code anywhere.

pub mod config;
pub mod crypto;
pub mod identity;
