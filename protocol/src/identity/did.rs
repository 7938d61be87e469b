//! # DID (Decentralized Identifier)
//!
//! Every identity document is addressed by a `did:sid:` identifier that
//! *contains* its controller's public key. Anyone holding the DID can check
//! a document's signature without a registry lookup, a resolver round trip,
//! or any other outside help.
//!
//! ## DID Format
//!
//! ```text
//! did:sid:<bech32(network_hrp, compressed_public_key)>
//! ```
//!
//! Example: `did:sid:sid1q0v8...` on mainnet, `did:sid:tsid1...` on testnet.
//!
//! The Bech32 HRP scopes the identifier to a network, so one key gives a
//! distinct DID per network, and the checksum catches copy/paste damage.
//! Extraction reverses the encoding and re-validates the curve point. Only
//! the lowercase Bech32 string is accepted, so each key has exactly one DID
//! per network.
//!
//! ## DID Document
//!
//! [`SidDid::to_did_document`] renders the W3C DID Core view of an
//! identifier: one `EcdsaSecp256k1VerificationKey2019` method, referenced
//! from `authentication` and `assertionMethod`.
//!
//! ## Standards References
//!
//! - [DID Core v1.0](https://www.w3.org/TR/did-core/)
//! - [BIP-173 Bech32](https://github.com/bitcoin/bips/blob/master/bip-0173.mediawiki)

use bech32::{Bech32, Hrp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{NetworkType, COMPRESSED_PUBLIC_KEY_LENGTH, DID_METHOD};
use crate::crypto::keys::SidPublicKey;

/// Context URI for the W3C DID Core specification.
const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// Context URI for the secp256k1 verification key suite.
const SECP256K1_CONTEXT: &str = "https://w3id.org/security/suites/secp256k1-2019/v1";

/// Verification method type for secp256k1 public keys.
const VERIFICATION_KEY_TYPE: &str = "EcdsaSecp256k1VerificationKey2019";

/// Multicodec prefix for `secp256k1-pub` (0xe7, varint-encoded).
const SECP256K1_MULTICODEC: [u8; 2] = [0xe7, 0x01];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during DID operations.
#[derive(Debug, Error)]
pub enum DidError {
    /// The string is not a well-formed `did:sid:` identifier, or the key
    /// inside it is not a valid curve point.
    #[error("malformed identifier '{did}': {reason}")]
    MalformedIdentifier { did: String, reason: String },

    /// Serialization error during document generation.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl DidError {
    fn malformed(did: &str, reason: impl Into<String>) -> Self {
        DidError::MalformedIdentifier {
            did: did.to_string(),
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Build the DID string for a public key on a network.
///
/// Same inputs, same string, every time.
pub fn construct_identifier(
    network: NetworkType,
    public_key: &SidPublicKey,
) -> Result<String, DidError> {
    Ok(SidDid::new(network, public_key)?.did)
}

/// Recover the public key embedded in a DID string.
pub fn extract_public_key(did: &str) -> Result<SidPublicKey, DidError> {
    Ok(SidDid::parse(did)?.public_key)
}

// ---------------------------------------------------------------------------
// SidDid
// ---------------------------------------------------------------------------

/// A parsed `did:sid:` identifier.
///
/// # Examples
///
/// ```
/// use sid_protocol::config::NetworkType;
/// use sid_protocol::crypto::SidKeypair;
/// use sid_protocol::identity::did::SidDid;
///
/// let kp = SidKeypair::generate();
/// let did = SidDid::new(NetworkType::Testnet, &kp.public_key()).unwrap();
/// assert!(did.to_string().starts_with("did:sid:tsid1"));
///
/// let parsed: SidDid = did.to_string().parse().unwrap();
/// assert_eq!(parsed.public_key(), &kp.public_key());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SidDid {
    network: NetworkType,
    public_key: SidPublicKey,
    did: String,
}

impl SidDid {
    /// Create the identifier for a public key on a network.
    pub fn new(network: NetworkType, public_key: &SidPublicKey) -> Result<Self, DidError> {
        let hrp = Hrp::parse(network.hrp())
            .map_err(|e| DidError::malformed(network.hrp(), e.to_string()))?;
        let encoded = bech32::encode::<Bech32>(hrp, public_key.as_bytes())
            .map_err(|e| DidError::malformed(&public_key.to_hex(), e.to_string()))?;
        Ok(Self {
            network,
            public_key: public_key.clone(),
            did: format!("did:{}:{}", DID_METHOD, encoded),
        })
    }

    /// Parse and validate a DID string.
    pub fn parse(did: &str) -> Result<Self, DidError> {
        let parts: Vec<&str> = did.splitn(3, ':').collect();
        if parts.len() != 3 {
            return Err(DidError::malformed(
                did,
                "expected format 'did:<method>:<identifier>'",
            ));
        }
        if parts[0] != "did" {
            return Err(DidError::malformed(
                did,
                format!("expected 'did' scheme, got '{}'", parts[0]),
            ));
        }
        if parts[1] != DID_METHOD {
            return Err(DidError::malformed(
                did,
                format!("unsupported method '{}'", parts[1]),
            ));
        }

        let (hrp, data) =
            bech32::decode(parts[2]).map_err(|e| DidError::malformed(did, e.to_string()))?;
        let network = NetworkType::from_hrp(&hrp.as_str().to_ascii_lowercase())
            .ok_or_else(|| DidError::malformed(did, format!("unknown network prefix '{}'", hrp)))?;

        if data.len() != COMPRESSED_PUBLIC_KEY_LENGTH {
            return Err(DidError::malformed(
                did,
                format!(
                    "expected {} key bytes, got {}",
                    COMPRESSED_PUBLIC_KEY_LENGTH,
                    data.len()
                ),
            ));
        }
        let public_key = SidPublicKey::from_sec1_bytes(&data)
            .map_err(|e| DidError::malformed(did, e.to_string()))?;

        // Only the lowercase Bech32 form is an identifier. Bech32m and
        // uppercase bodies decode to the same key but are different strings.
        let parsed = Self::new(network, &public_key)?;
        if parsed.did != did {
            return Err(DidError::malformed(
                did,
                format!("non-canonical encoding, expected '{}'", parsed.did),
            ));
        }
        Ok(parsed)
    }

    /// The network this identifier is scoped to.
    pub fn network(&self) -> NetworkType {
        self.network
    }

    /// The public key embedded in the identifier.
    pub fn public_key(&self) -> &SidPublicKey {
        &self.public_key
    }

    /// The full DID string.
    pub fn as_str(&self) -> &str {
        &self.did
    }

    /// Generate a W3C DID Document for this identifier.
    pub fn to_did_document(&self) -> DidDocument {
        let key_id = format!("{}#key-1", self.did);

        let mut multicodec_bytes = SECP256K1_MULTICODEC.to_vec();
        multicodec_bytes.extend_from_slice(self.public_key.as_bytes());
        // 'z' = base58btc in multibase.
        let public_key_multibase = format!("z{}", bs58::encode(&multicodec_bytes).into_string());

        DidDocument {
            context: vec![DID_CONTEXT.to_string(), SECP256K1_CONTEXT.to_string()],
            id: self.did.clone(),
            verification_method: vec![VerificationMethod {
                id: key_id.clone(),
                type_: VERIFICATION_KEY_TYPE.to_string(),
                controller: self.did.clone(),
                public_key_multibase,
            }],
            authentication: vec![key_id.clone()],
            assertion_method: vec![key_id],
            created: Utc::now(),
        }
    }
}

impl fmt::Display for SidDid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.did)
    }
}

impl FromStr for SidDid {
    type Err = DidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for SidDid {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.did)
    }
}

impl<'de> Deserialize<'de> for SidDid {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        SidDid::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// DID Document Types
// ---------------------------------------------------------------------------

/// A W3C DID Document describing a SID identifier.
///
/// SID identities are single-key, so every verification relationship
/// references the same method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DidDocument {
    /// JSON-LD context URIs.
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// The DID string this document describes.
    pub id: String,

    /// Verification methods (keys) associated with this DID.
    #[serde(rename = "verificationMethod")]
    pub verification_method: Vec<VerificationMethod>,

    /// References to verification methods usable for authentication.
    pub authentication: Vec<String>,

    /// References to verification methods usable for issuing assertions.
    #[serde(rename = "assertionMethod")]
    pub assertion_method: Vec<String>,

    /// When this document was rendered.
    pub created: DateTime<Utc>,
}

impl DidDocument {
    /// Serialize this document to a pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String, DidError> {
        serde_json::to_string_pretty(self).map_err(|e| DidError::Serialization(e.to_string()))
    }

    /// Parse a DID Document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, DidError> {
        serde_json::from_str(json).map_err(|e| DidError::Serialization(e.to_string()))
    }

    /// Validate the structure and that `id` is a parseable `did:sid:` string.
    pub fn validate(&self) -> Result<(), DidError> {
        SidDid::parse(&self.id)?;

        if self.verification_method.is_empty() {
            return Err(DidError::malformed(
                &self.id,
                "document must have at least one verification method",
            ));
        }
        if self.authentication.is_empty() {
            return Err(DidError::malformed(
                &self.id,
                "document must have at least one authentication method",
            ));
        }
        if !self.context.iter().any(|c| c == DID_CONTEXT) {
            return Err(DidError::malformed(
                &self.id,
                "document must include DID Core context",
            ));
        }
        Ok(())
    }
}

/// A verification method entry in a DID Document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationMethod {
    /// DID URL of this method (`<did>#key-1`).
    pub id: String,

    /// Key type, `EcdsaSecp256k1VerificationKey2019`.
    #[serde(rename = "type")]
    pub type_: String,

    /// The DID that controls this method.
    pub controller: String,

    /// Multicodec-prefixed public key, base58btc with a `z` prefix.
    #[serde(rename = "publicKeyMultibase")]
    pub public_key_multibase: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAINNET_HRP;
    use crate::crypto::keys::SidKeypair;
    use bech32::Bech32m;

    #[test]
    fn did_string_format() {
        let kp = SidKeypair::generate();
        let did = construct_identifier(NetworkType::Mainnet, &kp.public_key()).unwrap();
        assert!(did.starts_with("did:sid:sid1"), "got: {}", did);
    }

    #[test]
    fn network_scopes_identifier() {
        let kp = SidKeypair::generate();
        let main = construct_identifier(NetworkType::Mainnet, &kp.public_key()).unwrap();
        let test = construct_identifier(NetworkType::Testnet, &kp.public_key()).unwrap();
        let dev = construct_identifier(NetworkType::Devnet, &kp.public_key()).unwrap();
        assert_ne!(main, test);
        assert_ne!(test, dev);
        assert!(dev.starts_with("did:sid:dsid1"));
    }

    #[test]
    fn deterministic_identifier() {
        let kp = SidKeypair::from_hex(&"11".repeat(32)).unwrap();
        let a = construct_identifier(NetworkType::Mainnet, &kp.public_key()).unwrap();
        let b = construct_identifier(NetworkType::Mainnet, &kp.public_key()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn extract_recovers_public_key() {
        let kp = SidKeypair::generate();
        for net in [NetworkType::Mainnet, NetworkType::Testnet, NetworkType::Devnet] {
            let did = construct_identifier(net, &kp.public_key()).unwrap();
            assert_eq!(extract_public_key(&did).unwrap(), kp.public_key());
            assert_eq!(SidDid::parse(&did).unwrap().network(), net);
        }
    }

    #[test]
    fn distinct_keys_distinct_identifiers() {
        let a = SidKeypair::generate();
        let b = SidKeypair::generate();
        assert_ne!(
            construct_identifier(NetworkType::Mainnet, &a.public_key()).unwrap(),
            construct_identifier(NetworkType::Mainnet, &b.public_key()).unwrap()
        );
    }

    #[test]
    fn uppercase_identifier_rejected() {
        let kp = SidKeypair::generate();
        let did = SidDid::new(NetworkType::Mainnet, &kp.public_key()).unwrap();
        let body = did.as_str().trim_start_matches("did:sid:").to_uppercase();
        let result = SidDid::parse(&format!("did:sid:{}", body));
        assert!(matches!(result, Err(DidError::MalformedIdentifier { .. })));
    }

    #[test]
    fn bech32m_identifier_rejected() {
        let kp = SidKeypair::generate();
        let hrp = Hrp::parse(MAINNET_HRP).unwrap();
        let body = bech32::encode::<Bech32m>(hrp, kp.public_key().as_bytes()).unwrap();
        let result = extract_public_key(&format!("did:sid:{}", body));
        assert!(matches!(result, Err(DidError::MalformedIdentifier { .. })));
    }

    #[test]
    fn parse_round_trips_exact_string() {
        let kp = SidKeypair::generate();
        let did = construct_identifier(NetworkType::Testnet, &kp.public_key()).unwrap();
        assert_eq!(SidDid::parse(&did).unwrap().as_str(), did);
    }

    #[test]
    fn invalid_scheme_rejected() {
        let result = extract_public_key("notadid:sid:sid1abc");
        assert!(matches!(result, Err(DidError::MalformedIdentifier { .. })));
    }

    #[test]
    fn wrong_method_rejected() {
        let result = extract_public_key("did:ethr:0xabc123");
        assert!(matches!(result, Err(DidError::MalformedIdentifier { .. })));
    }

    #[test]
    fn corrupted_checksum_rejected() {
        let kp = SidKeypair::generate();
        let did = construct_identifier(NetworkType::Mainnet, &kp.public_key()).unwrap();
        let mut chars: Vec<char> = did.chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == 'q' { 'p' } else { 'q' };
        let corrupted: String = chars.into_iter().collect();
        assert!(extract_public_key(&corrupted).is_err());
    }

    #[test]
    fn foreign_hrp_rejected() {
        let kp = SidKeypair::generate();
        let hrp = Hrp::parse("nova").unwrap();
        let body = bech32::encode::<Bech32>(hrp, kp.public_key().as_bytes()).unwrap();
        let result = extract_public_key(&format!("did:sid:{}", body));
        assert!(matches!(result, Err(DidError::MalformedIdentifier { .. })));
    }

    #[test]
    fn off_curve_payload_rejected() {
        let hrp = Hrp::parse("sid").unwrap();
        let mut bogus = vec![0x02];
        bogus.extend_from_slice(&[0xFF; 32]);
        let body = bech32::encode::<Bech32>(hrp, &bogus).unwrap();
        assert!(extract_public_key(&format!("did:sid:{}", body)).is_err());
    }

    #[test]
    fn did_document_has_required_fields() {
        let kp = SidKeypair::generate();
        let did = SidDid::new(NetworkType::Mainnet, &kp.public_key()).unwrap();
        let doc = did.to_did_document();

        assert!(doc.context.contains(&DID_CONTEXT.to_string()));
        assert!(doc.context.contains(&SECP256K1_CONTEXT.to_string()));
        assert_eq!(doc.id, did.to_string());
        assert_eq!(doc.verification_method.len(), 1);

        let vm = &doc.verification_method[0];
        assert_eq!(vm.type_, VERIFICATION_KEY_TYPE);
        assert_eq!(vm.controller, did.to_string());
        assert!(doc.authentication.contains(&vm.id));
        assert!(doc.assertion_method.contains(&vm.id));
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn multibase_key_encodes_multicodec_prefix() {
        let kp = SidKeypair::generate();
        let did = SidDid::new(NetworkType::Mainnet, &kp.public_key()).unwrap();
        let doc = did.to_did_document();

        let multibase = &doc.verification_method[0].public_key_multibase;
        assert!(multibase.starts_with('z'));
        let decoded = bs58::decode(&multibase[1..]).into_vec().unwrap();
        assert_eq!(&decoded[..2], &SECP256K1_MULTICODEC);
        assert_eq!(&decoded[2..], kp.public_key().as_bytes());
    }

    #[test]
    fn did_document_json_roundtrip() {
        let kp = SidKeypair::generate();
        let did = SidDid::new(NetworkType::Testnet, &kp.public_key()).unwrap();
        let json = did.to_did_document().to_json().unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("@context").is_some());
        assert!(parsed.get("verificationMethod").is_some());

        let doc = DidDocument::from_json(&json).unwrap();
        assert_eq!(doc.id, did.to_string());
    }

    #[test]
    fn invalid_document_rejected() {
        let doc = DidDocument {
            context: vec![],
            id: "not-a-did".to_string(),
            verification_method: vec![],
            authentication: vec![],
            assertion_method: vec![],
            created: Utc::now(),
        };
        assert!(doc.validate().is_err());
    }

    #[test]
    fn did_serde_json_roundtrip() {
        let kp = SidKeypair::generate();
        let did = SidDid::new(NetworkType::Devnet, &kp.public_key()).unwrap();
        let json = serde_json::to_string(&did).unwrap();
        let recovered: SidDid = serde_json::from_str(&json).unwrap();
        assert_eq!(did, recovered);
    }
}
