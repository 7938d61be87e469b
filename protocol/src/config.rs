//! # Protocol Configuration & Constants
//!
//! Every magic number in SID lives here. If you're hardcoding a constant
//! somewhere else, you're doing it wrong.
//!
//! Two kinds of things live in this file:
//!
//! - **Constants** that define the wire shape of identifiers and signatures.
//!   Changing them after documents exist in the wild invalidates every one
//!   of those documents, so don't.
//! - [`IdentityConfig`], the handful of caller-tunable defaults (network,
//!   derivation path, wordlist locale, mnemonic length). It deserializes from
//!   JSON so applications can ship it alongside their own settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Identifier Parameters
// ---------------------------------------------------------------------------

/// DID method name. Every identifier looks like `did:sid:<bech32>`.
pub const DID_METHOD: &str = "sid";

/// Human-readable Bech32 prefixes, one per network. The prefix is what makes
/// an identifier network-scoped: the same key yields a different DID on each.
pub const MAINNET_HRP: &str = "sid";
pub const TESTNET_HRP: &str = "tsid";
pub const DEVNET_HRP: &str = "dsid";

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// ECDSA over secp256k1 — the curve every EVM wallet already holds keys for.
pub const SIGNING_ALGORITHM: &str = "ECDSA-secp256k1";

/// Raw private scalar length in bytes.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Compressed SEC1 public key length: one parity byte plus the x coordinate.
pub const COMPRESSED_PUBLIC_KEY_LENGTH: usize = 33;

/// Uncompressed SEC1 public key length: `0x04 || x || y`.
pub const UNCOMPRESSED_PUBLIC_KEY_LENGTH: usize = 65;

/// Digest applied to canonical document bytes before signing.
pub const DIGEST_ALGORITHM: &str = "SHA-256";

/// Digest output length in bytes.
pub const DIGEST_LENGTH: usize = 32;

/// Upper bound of a DER-encoded secp256k1 signature (two 33-byte integers
/// plus framing). Anything longer is rejected before parsing.
pub const MAX_DER_SIGNATURE_LENGTH: usize = 72;

/// Account address length in bytes (the tail of the Keccak-256 digest).
pub const ADDRESS_LENGTH: usize = 20;

// ---------------------------------------------------------------------------
// Key Derivation Defaults
// ---------------------------------------------------------------------------

/// BIP-44 path of the first Ethereum account. Wallets that already hold a
/// mnemonic land on the same key and address.
pub const DEFAULT_DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// Wordlist used when the caller gives no locale, or one we don't know.
pub const DEFAULT_LOCALE: &str = "en";

/// Word count for freshly generated mnemonics (128 bits of entropy).
pub const DEFAULT_MNEMONIC_WORDS: usize = 12;

// ---------------------------------------------------------------------------
// Networks
// ---------------------------------------------------------------------------

/// The network an identifier is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    /// Production identities.
    #[default]
    Mainnet,
    /// Public test network.
    Testnet,
    /// Local development. Reset whenever someone feels like it.
    Devnet,
}

impl NetworkType {
    /// Bech32 HRP used when encoding identifiers on this network.
    pub fn hrp(&self) -> &'static str {
        match self {
            NetworkType::Mainnet => MAINNET_HRP,
            NetworkType::Testnet => TESTNET_HRP,
            NetworkType::Devnet => DEVNET_HRP,
        }
    }

    /// Map a Bech32 HRP back to its network. `None` for foreign prefixes.
    pub fn from_hrp(hrp: &str) -> Option<Self> {
        match hrp {
            MAINNET_HRP => Some(NetworkType::Mainnet),
            TESTNET_HRP => Some(NetworkType::Testnet),
            DEVNET_HRP => Some(NetworkType::Devnet),
            _ => None,
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkType::Mainnet => write!(f, "mainnet"),
            NetworkType::Testnet => write!(f, "testnet"),
            NetworkType::Devnet => write!(f, "devnet"),
        }
    }
}

// ---------------------------------------------------------------------------
// IdentityConfig
// ---------------------------------------------------------------------------

/// Errors raised while loading an [`IdentityConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported mnemonic length: {0} words (expected 12 or 24)")]
    MnemonicWords(usize),
}

/// Caller-tunable defaults for key derivation and identity creation.
///
/// Every field has a default, so a config file only needs to mention what it
/// changes:
///
/// ```
/// use sid_protocol::config::{IdentityConfig, NetworkType};
///
/// let cfg = IdentityConfig::from_json(r#"{ "network": "testnet" }"#).unwrap();
/// assert_eq!(cfg.network, NetworkType::Testnet);
/// assert_eq!(cfg.derivation_path, "m/44'/60'/0'/0/0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Network new identifiers are scoped to.
    pub network: NetworkType,
    /// HD path used when deriving keys from a mnemonic.
    pub derivation_path: String,
    /// Wordlist locale code (`en`, `zh_cn`, `ja`, ...).
    pub locale: String,
    /// Length of freshly generated mnemonics: 12 or 24.
    pub mnemonic_words: usize,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            network: NetworkType::default(),
            derivation_path: DEFAULT_DERIVATION_PATH.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            mnemonic_words: DEFAULT_MNEMONIC_WORDS,
        }
    }
}

impl IdentityConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read a JSON config file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Reject settings that would fail later, deep inside derivation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.mnemonic_words {
            12 | 24 => Ok(()),
            n => Err(ConfigError::MnemonicWords(n)),
        }
    }

    /// Entropy length in bytes for the configured mnemonic length.
    pub fn entropy_bytes(&self) -> usize {
        // 12 words = 128 bits, 24 words = 256 bits.
        self.mnemonic_words / 3 * 4
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
