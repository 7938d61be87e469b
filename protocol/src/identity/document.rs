//! # Identity Documents
//!
//! An [`Identity`] is a signed, versioned record describing one subject — a
//! person, an organization, a service, or an application — and pointing at
//! the key that controls it through its DID.
//!
//! ```text
//! Identity
//!  ├── block_address    encrypted key blob, carried verbatim
//!  ├── metadata         network, did, address, name, ..., version, timestamps
//!  ├── security_config  opaque policy bytes, carried verbatim
//!  ├── extend           exactly one profile variant, matching metadata.code
//!  └── signature        hex DER over the canonical bytes; "" while unsigned
//! ```
//!
//! The profile extension is an enum, so "exactly one variant is populated"
//! holds by construction. What still needs checking at runtime is that the
//! variant agrees with `metadata.code`, which [`Identity::extension_matches_code`]
//! does.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::NetworkType;

// ---------------------------------------------------------------------------
// IdentityCode
// ---------------------------------------------------------------------------

/// Numeric identity code for a personal profile.
pub const IDENTITY_CODE_PERSONAL: u32 = 1;
/// Numeric identity code for an organization profile.
pub const IDENTITY_CODE_ORGANIZATION: u32 = 2;
/// Numeric identity code for a service profile.
pub const IDENTITY_CODE_SERVICE: u32 = 3;
/// Numeric identity code for an application profile.
pub const IDENTITY_CODE_APPLICATION: u32 = 4;

/// The closed set of subject kinds an identity can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum IdentityCode {
    Personal,
    Organization,
    Service,
    Application,
}

impl IdentityCode {
    /// Wire value of this code.
    pub fn as_u32(&self) -> u32 {
        match self {
            IdentityCode::Personal => IDENTITY_CODE_PERSONAL,
            IdentityCode::Organization => IDENTITY_CODE_ORGANIZATION,
            IdentityCode::Service => IDENTITY_CODE_SERVICE,
            IdentityCode::Application => IDENTITY_CODE_APPLICATION,
        }
    }
}

/// A numeric code outside the known set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownIdentityCode(pub u32);

impl fmt::Display for UnknownIdentityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown identity code {}", self.0)
    }
}

impl TryFrom<u32> for IdentityCode {
    type Error = UnknownIdentityCode;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            IDENTITY_CODE_PERSONAL => Ok(IdentityCode::Personal),
            IDENTITY_CODE_ORGANIZATION => Ok(IdentityCode::Organization),
            IDENTITY_CODE_SERVICE => Ok(IdentityCode::Service),
            IDENTITY_CODE_APPLICATION => Ok(IdentityCode::Application),
            other => Err(UnknownIdentityCode(other)),
        }
    }
}

impl From<IdentityCode> for u32 {
    fn from(code: IdentityCode) -> Self {
        code.as_u32()
    }
}

impl fmt::Display for IdentityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IdentityCode::Personal => "personal",
            IdentityCode::Organization => "organization",
            IdentityCode::Service => "service",
            IdentityCode::Application => "application",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Profile extensions
// ---------------------------------------------------------------------------

/// Profile of a natural person.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalExtend {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    /// ISO-8601 calendar date, e.g. `1990-04-01`.
    pub birthday: String,
    pub nationality: String,
    pub email: String,
    pub phone: String,
}

/// Profile of a legal entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationExtend {
    pub legal_name: String,
    pub registration_number: String,
    pub jurisdiction: String,
    pub website: String,
    pub contact_email: String,
}

/// Profile of a network-reachable service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceExtend {
    pub service_type: String,
    pub endpoint: String,
    pub version: String,
    pub operator: String,
}

/// Profile of a client application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationExtend {
    pub app_id: String,
    pub platform: String,
    pub homepage: String,
    pub redirect_uris: Vec<String>,
}

/// The subject-specific payload of an identity. One variant per
/// [`IdentityCode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileExtension {
    Personal(PersonalExtend),
    Organization(OrganizationExtend),
    Service(ServiceExtend),
    Application(ApplicationExtend),
}

impl ProfileExtension {
    /// The identity code this variant belongs to.
    pub fn code(&self) -> IdentityCode {
        match self {
            ProfileExtension::Personal(_) => IdentityCode::Personal,
            ProfileExtension::Organization(_) => IdentityCode::Organization,
            ProfileExtension::Service(_) => IdentityCode::Service,
            ProfileExtension::Application(_) => IdentityCode::Application,
        }
    }

    pub fn as_personal(&self) -> Option<&PersonalExtend> {
        match self {
            ProfileExtension::Personal(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_organization(&self) -> Option<&OrganizationExtend> {
        match self {
            ProfileExtension::Organization(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_service(&self) -> Option<&ServiceExtend> {
        match self {
            ProfileExtension::Service(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_application(&self) -> Option<&ApplicationExtend> {
        match self {
            ProfileExtension::Application(a) => Some(a),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Metadata & security config
// ---------------------------------------------------------------------------

/// Opaque security policy. Never interpreted here, only signed over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub policy: Vec<u8>,
}

impl SecurityConfig {
    pub fn new(policy: impl Into<Vec<u8>>) -> Self {
        Self {
            policy: policy.into(),
        }
    }
}

/// Descriptive and bookkeeping fields of an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityMetadata {
    pub network: NetworkType,
    /// `did:sid:` identifier of the controlling key.
    pub did: String,
    /// EIP-55 account address of the controlling key.
    pub address: String,
    pub name: String,
    pub description: String,
    /// DID of a parent identity, or empty.
    pub parent: String,
    pub code: IdentityCode,
    /// Avatar URL, or empty.
    pub avatar: String,
    /// Starts at 0, +1 per accepted update.
    pub version: u64,
    /// Set once at creation.
    pub created: DateTime<Utc>,
    /// Time of the latest accepted mutation.
    pub checkpoint: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Where an identity sits in its signing lifecycle.
///
/// Verification outcomes are not states: they are computed on demand by
/// [`verify`](crate::identity::lifecycle::verify) and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    Unsigned,
    Signed,
}

/// A self-sovereign identity document.
///
/// Field order matters: it is the order of the binary encoding, and therefore
/// part of what gets signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Encrypted key material blob, carried verbatim.
    pub block_address: Vec<u8>,
    pub metadata: IdentityMetadata,
    pub security_config: SecurityConfig,
    pub extend: ProfileExtension,
    /// Hex-encoded DER signature; empty until signed.
    pub signature: String,
}

impl Identity {
    /// Current lifecycle state.
    pub fn state(&self) -> DocumentState {
        if self.signature.is_empty() {
            DocumentState::Unsigned
        } else {
            DocumentState::Signed
        }
    }

    /// `true` once a signature has been embedded.
    pub fn is_signed(&self) -> bool {
        self.state() == DocumentState::Signed
    }

    /// `true` when the populated extension variant agrees with `metadata.code`.
    pub fn extension_matches_code(&self) -> bool {
        self.extend.code() == self.metadata.code
    }

    /// Export as pretty JSON, e.g. for handing to a wallet UI.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Import from JSON. Parsing does not verify; call
    /// [`verify`](crate::identity::lifecycle::verify) on the result.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ---------------------------------------------------------------------------
// IdentityTemplate
// ---------------------------------------------------------------------------

/// The caller-supplied fields for [`create`](crate::identity::lifecycle::create)
/// and [`update`](crate::identity::lifecycle::update).
///
/// `code` is the raw wire value so that an out-of-range code can be reported
/// as such instead of being unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityTemplate {
    /// Network for new identities. Ignored by `update`: an identity never
    /// changes network.
    pub network: NetworkType,
    pub name: String,
    pub description: String,
    pub parent: String,
    pub code: u32,
    pub avatar: String,
    pub security_config: SecurityConfig,
    pub extend: ProfileExtension,
}

impl IdentityTemplate {
    /// Start a template whose code is taken from the extension.
    pub fn new(name: impl Into<String>, extend: ProfileExtension) -> Self {
        Self {
            network: NetworkType::default(),
            name: name.into(),
            description: String::new(),
            parent: String::new(),
            code: extend.code().as_u32(),
            avatar: String::new(),
            security_config: SecurityConfig::default(),
            extend,
        }
    }

    pub fn network(mut self, network: NetworkType) -> Self {
        self.network = network;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = parent.into();
        self
    }

    pub fn avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = avatar.into();
        self
    }

    pub fn security_config(mut self, config: SecurityConfig) -> Self {
        self.security_config = config;
        self
    }

    /// Override the raw code. Mostly useful for exercising rejection paths.
    pub fn code(mut self, code: u32) -> Self {
        self.code = code;
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_code_roundtrip() {
        for code in [
            IdentityCode::Personal,
            IdentityCode::Organization,
            IdentityCode::Service,
            IdentityCode::Application,
        ] {
            assert_eq!(IdentityCode::try_from(code.as_u32()), Ok(code));
        }
    }

    #[test]
    fn unknown_identity_codes_rejected() {
        assert_eq!(IdentityCode::try_from(0), Err(UnknownIdentityCode(0)));
        assert_eq!(IdentityCode::try_from(5), Err(UnknownIdentityCode(5)));
        assert_eq!(IdentityCode::try_from(u32::MAX), Err(UnknownIdentityCode(u32::MAX)));
    }

    #[test]
    fn identity_code_serializes_as_number() {
        let json = serde_json::to_string(&IdentityCode::Service).unwrap();
        assert_eq!(json, "3");
        assert!(serde_json::from_str::<IdentityCode>("9").is_err());
    }

    #[test]
    fn extension_variant_reports_its_code() {
        let ext = ProfileExtension::Organization(OrganizationExtend::default());
        assert_eq!(ext.code(), IdentityCode::Organization);
        assert!(ext.as_organization().is_some());
        assert!(ext.as_personal().is_none());
        assert!(ext.as_service().is_none());
        assert!(ext.as_application().is_none());
    }

    #[test]
    fn template_takes_code_from_extension() {
        let t = IdentityTemplate::new("acme", ProfileExtension::Service(ServiceExtend::default()));
        assert_eq!(t.code, IDENTITY_CODE_SERVICE);
        let t = t.code(42).network(NetworkType::Devnet).description("d");
        assert_eq!(t.code, 42);
        assert_eq!(t.network, NetworkType::Devnet);
        assert_eq!(t.description, "d");
    }

    #[test]
    fn document_state_follows_signature() {
        let now = Utc::now();
        let mut id = Identity {
            block_address: vec![],
            metadata: IdentityMetadata {
                network: NetworkType::Mainnet,
                did: String::new(),
                address: String::new(),
                name: "n".into(),
                description: String::new(),
                parent: String::new(),
                code: IdentityCode::Personal,
                avatar: String::new(),
                version: 0,
                created: now,
                checkpoint: now,
            },
            security_config: SecurityConfig::default(),
            extend: ProfileExtension::Personal(PersonalExtend::default()),
            signature: String::new(),
        };
        assert_eq!(id.state(), DocumentState::Unsigned);
        assert!(id.extension_matches_code());

        id.signature = "3006".into();
        assert!(id.is_signed());

        id.metadata.code = IdentityCode::Application;
        assert!(!id.extension_matches_code());
    }
}
