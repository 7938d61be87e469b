//! Binary codec and canonical form for identity documents.
//!
//! The binary encoding is `bincode` over the serde layout of [`Identity`]:
//! fields in declaration order, fixed-width little-endian integers,
//! length-prefixed strings and byte vectors. There are no maps anywhere in
//! the document, so a given value has exactly one encoding.
//!
//! [`canonical_bytes`] is the encoding of the document with its signature
//! field forced to the empty string. It serializes a borrowed view rather
//! than a modified copy, so the document itself is never touched: a reader
//! computing canonical bytes cannot observe, or cause, a missing signature.

use serde::Serialize;
use thiserror::Error;

use super::document::{Identity, IdentityMetadata, ProfileExtension, SecurityConfig};

/// Errors from encoding or decoding documents.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode identity: {0}")]
    Encode(String),

    #[error("failed to decode identity: {0}")]
    Decode(String),
}

/// The signable projection of an [`Identity`].
///
/// Field order and types mirror `Identity` exactly, so this encodes to the
/// same bytes as an `Identity` whose signature is `""`.
#[derive(Serialize)]
struct CanonicalView<'a> {
    block_address: &'a Vec<u8>,
    metadata: &'a IdentityMetadata,
    security_config: &'a SecurityConfig,
    extend: &'a ProfileExtension,
    signature: &'static str,
}

impl<'a> From<&'a Identity> for CanonicalView<'a> {
    fn from(identity: &'a Identity) -> Self {
        Self {
            block_address: &identity.block_address,
            metadata: &identity.metadata,
            security_config: &identity.security_config,
            extend: &identity.extend,
            signature: "",
        }
    }
}

/// Encode a document, signature included.
pub fn encode(identity: &Identity) -> Result<Vec<u8>, CodecError> {
    bincode::serialize(identity).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decode a document produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<Identity, CodecError> {
    bincode::deserialize(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}

/// Encode a document with its signature field treated as empty.
///
/// Depends only on the signable fields: two documents that differ only in
/// their signatures produce identical bytes.
pub fn canonical_bytes(identity: &Identity) -> Result<Vec<u8>, CodecError> {
    bincode::serialize(&CanonicalView::from(identity))
        .map_err(|e| CodecError::Encode(e.to_string()))
}

/// Deep copy through the codec. The copy shares nothing with the original.
pub fn deep_clone(identity: &Identity) -> Result<Identity, CodecError> {
    decode(&encode(identity)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkType;
    use crate::identity::document::{
        IdentityCode, IdentityMetadata, PersonalExtend, ProfileExtension, SecurityConfig,
    };
    use chrono::{TimeZone, Utc};

    fn sample() -> Identity {
        let created = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        Identity {
            block_address: vec![1, 2, 3, 4],
            metadata: IdentityMetadata {
                network: NetworkType::Testnet,
                did: "did:sid:tsid1example".into(),
                address: "0x0000000000000000000000000000000000000000".into(),
                name: "alice".into(),
                description: "test subject".into(),
                parent: String::new(),
                code: IdentityCode::Personal,
                avatar: "https://example.org/a.png".into(),
                version: 7,
                created,
                checkpoint: created,
            },
            security_config: SecurityConfig::new(b"policy".to_vec()),
            extend: ProfileExtension::Personal(PersonalExtend {
                first_name: "Alice".into(),
                ..PersonalExtend::default()
            }),
            signature: "3045deadbeef".into(),
        }
    }

    #[test]
    fn encode_decode_preserves_document() {
        let id = sample();
        let bytes = encode(&id).unwrap();
        assert_eq!(decode(&bytes).unwrap(), id);
    }

    #[test]
    fn canonical_bytes_equal_encoding_with_cleared_signature() {
        let id = sample();
        let mut cleared = id.clone();
        cleared.signature.clear();
        assert_eq!(canonical_bytes(&id).unwrap(), encode(&cleared).unwrap());
    }

    #[test]
    fn canonical_bytes_ignore_signature() {
        let a = sample();
        let mut b = sample();
        b.signature = "ffff".into();
        assert_eq!(canonical_bytes(&a).unwrap(), canonical_bytes(&b).unwrap());
    }

    #[test]
    fn canonical_bytes_are_stable_across_calls() {
        let id = sample();
        let first = canonical_bytes(&id).unwrap();
        for _ in 0..5 {
            assert_eq!(canonical_bytes(&id).unwrap(), first);
        }
    }

    #[test]
    fn canonical_bytes_do_not_touch_the_document() {
        let id = sample();
        let before = id.signature.clone();
        let _ = canonical_bytes(&id).unwrap();
        assert_eq!(id.signature, before);
    }

    #[test]
    fn canonical_bytes_track_signable_fields() {
        let a = sample();
        let mut b = sample();
        b.metadata.version += 1;
        assert_ne!(canonical_bytes(&a).unwrap(), canonical_bytes(&b).unwrap());

        let mut c = sample();
        c.block_address.push(0);
        assert_ne!(canonical_bytes(&a).unwrap(), canonical_bytes(&c).unwrap());
    }

    #[test]
    fn deep_clone_is_independent() {
        let original = sample();
        let mut copy = deep_clone(&original).unwrap();
        assert_eq!(copy, original);
        copy.metadata.name.push_str(" (edited)");
        copy.block_address.clear();
        assert_eq!(original.metadata.name, "alice");
        assert_eq!(original.block_address, vec![1, 2, 3, 4]);
    }

    #[test]
    fn truncated_bytes_fail_to_decode() {
        let bytes = encode(&sample()).unwrap();
        let err = decode(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }
}
