//! # Key Derivation
//!
//! Turns a BIP-39 mnemonic (recovered or freshly generated) into the key
//! material that controls an identity:
//!
//! ```text
//! phrase + password --BIP-39--> 64-byte seed --BIP-32 path--> secp256k1 key
//!     -> compressed public key -> EIP-55 address
//! ```
//!
//! The seed and path arithmetic belong to `bip39`/`bip32`; this module only
//! wires them together and records enough ([`MnemonicInfo`]) to re-derive
//! the same key later.

use bip32::{DerivationPath, XPrv};
use bip39::Mnemonic;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

use super::address::compute_address;
use super::wordlist::Wordlist;
use crate::config::IdentityConfig;
use crate::crypto::keys::{KeyError, SidKeypair, SidPublicKey};

/// Errors that can occur while deriving key material.
#[derive(Debug, Error)]
pub enum DerivationError {
    /// The phrase has unknown words, a bad word count, or a failed checksum
    /// for the selected wordlist.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// The derivation path does not parse as a BIP-32 path.
    #[error("invalid derivation path '{path}'")]
    InvalidDerivationPath { path: String },

    /// Unsupported entropy length for a new mnemonic.
    #[error("invalid entropy length: {0} bytes")]
    InvalidEntropy(usize),

    /// Child key derivation failed (astronomically unlikely, but possible).
    #[error("key derivation failed: {0}")]
    Derivation(String),

    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Everything needed to re-derive a key from its mnemonic.
///
/// This is secret material — the phrase alone recovers the key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MnemonicInfo {
    /// The space-separated mnemonic phrase.
    pub phrase: String,
    /// BIP-39 passphrase ("25th word"). Empty when unused.
    pub password: String,
    /// BIP-32 path the key was derived at.
    pub path: String,
    /// Wordlist the phrase belongs to.
    pub locale: Wordlist,
}

impl fmt::Debug for MnemonicInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MnemonicInfo")
            .field("path", &self.path)
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

/// A private/public key pair together with its derived address and origin.
///
/// The public key and the address are computed from the private key at
/// construction and never set independently, so they cannot drift apart.
#[derive(Clone)]
pub struct KeyMaterial {
    keypair: SidKeypair,
    public_key: SidPublicKey,
    address: String,
    path: String,
    mnemonic: Option<MnemonicInfo>,
}

impl KeyMaterial {
    fn new(
        keypair: SidKeypair,
        path: String,
        mnemonic: Option<MnemonicInfo>,
    ) -> Result<Self, DerivationError> {
        let public_key = keypair.public_key();
        let address = compute_address(&public_key)?;
        Ok(Self {
            keypair,
            public_key,
            address,
            path,
            mnemonic,
        })
    }

    /// Import a raw hex private key. The result has no mnemonic and no path.
    pub fn from_private_key_hex(private_key_hex: &str) -> Result<Self, DerivationError> {
        let keypair = SidKeypair::from_hex(private_key_hex)?;
        Self::new(keypair, String::new(), None)
    }

    /// The keypair used for signing.
    pub fn keypair(&self) -> &SidKeypair {
        &self.keypair
    }

    /// Raw 32-byte private key.
    pub fn private_key(&self) -> [u8; 32] {
        self.keypair.to_bytes()
    }

    /// Compressed public key.
    pub fn public_key(&self) -> &SidPublicKey {
        &self.public_key
    }

    /// EIP-55 account address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Derivation path; empty for imported keys.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Mnemonic details, present only for mnemonic-derived keys.
    pub fn mnemonic_info(&self) -> Option<&MnemonicInfo> {
        self.mnemonic.as_ref()
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("public_key", &self.public_key)
            .field("address", &self.address)
            .field("path", &self.path)
            .field("has_mnemonic", &self.mnemonic.is_some())
            .finish()
    }
}

/// Recover key material from an existing mnemonic phrase.
///
/// Deterministic: the same phrase, password, path and wordlist always give
/// the same key and address.
///
/// # Example
///
/// ```
/// use sid_protocol::identity::wallet::derive_from_mnemonic;
/// use sid_protocol::identity::Wordlist;
///
/// let phrase = "abandon abandon abandon abandon abandon abandon \
///               abandon abandon abandon abandon abandon about";
/// let km = derive_from_mnemonic(phrase, "", "m/44'/60'/0'/0/0", Wordlist::English).unwrap();
/// assert_eq!(km.address(), "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
/// ```
pub fn derive_from_mnemonic(
    phrase: &str,
    password: &str,
    path: &str,
    wordlist: Wordlist,
) -> Result<KeyMaterial, DerivationError> {
    let mnemonic = Mnemonic::parse_in(wordlist.language(), phrase)
        .map_err(|e| DerivationError::InvalidMnemonic(e.to_string()))?;
    derive(mnemonic, password, path, wordlist)
}

/// Generate a fresh mnemonic and derive key material from it.
///
/// Uses 128 bits of OS entropy (12 words). Never deterministic.
pub fn derive_random(
    password: &str,
    path: &str,
    wordlist: Wordlist,
) -> Result<KeyMaterial, DerivationError> {
    derive_random_with_entropy(16, password, path, wordlist)
}

/// Like [`derive_random`], with the mnemonic length and defaults taken from
/// an [`IdentityConfig`].
pub fn derive_random_with_config(
    password: &str,
    config: &IdentityConfig,
) -> Result<KeyMaterial, DerivationError> {
    derive_random_with_entropy(
        config.entropy_bytes(),
        password,
        &config.derivation_path,
        Wordlist::lookup(&config.locale),
    )
}

fn derive_random_with_entropy(
    entropy_len: usize,
    password: &str,
    path: &str,
    wordlist: Wordlist,
) -> Result<KeyMaterial, DerivationError> {
    if !matches!(entropy_len, 16 | 20 | 24 | 28 | 32) {
        return Err(DerivationError::InvalidEntropy(entropy_len));
    }
    let mut entropy = vec![0u8; entropy_len];
    OsRng.fill_bytes(&mut entropy);

    let mnemonic = Mnemonic::from_entropy_in(wordlist.language(), &entropy)
        .map_err(|e| DerivationError::InvalidMnemonic(e.to_string()))?;
    entropy.iter_mut().for_each(|b| *b = 0);

    derive(mnemonic, password, path, wordlist)
}

fn derive(
    mnemonic: Mnemonic,
    password: &str,
    path: &str,
    wordlist: Wordlist,
) -> Result<KeyMaterial, DerivationError> {
    let derivation_path: DerivationPath =
        path.parse().map_err(|_| DerivationError::InvalidDerivationPath {
            path: path.to_string(),
        })?;

    let seed = mnemonic.to_seed(password);
    let xprv = XPrv::derive_from_path(seed, &derivation_path)
        .map_err(|e| DerivationError::Derivation(e.to_string()))?;
    let keypair = SidKeypair::from_signing_key(xprv.private_key().clone());

    let info = MnemonicInfo {
        phrase: mnemonic.to_string(),
        password: password.to_string(),
        path: path.to_string(),
        locale: wordlist,
    };

    let material = KeyMaterial::new(keypair, path.to_string(), Some(info))?;
    debug!(address = %material.address, path, locale = %wordlist, "derived key material");
    Ok(material)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_DERIVATION_PATH;

    const ABANDON: &str = "abandon abandon abandon abandon abandon abandon \
                           abandon abandon abandon abandon abandon about";

    #[test]
    fn known_vector_abandon_about() {
        let km = derive_from_mnemonic(ABANDON, "", DEFAULT_DERIVATION_PATH, Wordlist::English)
            .unwrap();
        assert_eq!(
            hex::encode(km.private_key()),
            "1ab42cc412b618bdea3a599e3c9bae199ebf030895b039e9db1e30dafb12b727"
        );
        assert_eq!(km.address(), "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
    }

    #[test]
    fn recovery_is_deterministic() {
        let a = derive_from_mnemonic(ABANDON, "", DEFAULT_DERIVATION_PATH, Wordlist::English)
            .unwrap();
        let b = derive_from_mnemonic(ABANDON, "", DEFAULT_DERIVATION_PATH, Wordlist::English)
            .unwrap();
        assert_eq!(a.address(), b.address());
        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn password_changes_the_key() {
        let plain = derive_from_mnemonic(ABANDON, "", DEFAULT_DERIVATION_PATH, Wordlist::English)
            .unwrap();
        let salted =
            derive_from_mnemonic(ABANDON, "TREZOR", DEFAULT_DERIVATION_PATH, Wordlist::English)
                .unwrap();
        assert_ne!(plain.public_key(), salted.public_key());
    }

    #[test]
    fn path_changes_the_key() {
        let first = derive_from_mnemonic(ABANDON, "", "m/44'/60'/0'/0/0", Wordlist::English)
            .unwrap();
        let second = derive_from_mnemonic(ABANDON, "", "m/44'/60'/0'/0/1", Wordlist::English)
            .unwrap();
        assert_ne!(first.address(), second.address());
    }

    #[test]
    fn bad_checksum_is_invalid_mnemonic() {
        let phrase = "abandon abandon abandon abandon abandon abandon \
                      abandon abandon abandon abandon abandon abandon";
        let err = derive_from_mnemonic(phrase, "", DEFAULT_DERIVATION_PATH, Wordlist::English)
            .unwrap_err();
        assert!(matches!(err, DerivationError::InvalidMnemonic(_)));
    }

    #[test]
    fn wrong_wordlist_is_invalid_mnemonic() {
        let err = derive_from_mnemonic(ABANDON, "", DEFAULT_DERIVATION_PATH, Wordlist::Japanese)
            .unwrap_err();
        assert!(matches!(err, DerivationError::InvalidMnemonic(_)));
    }

    #[test]
    fn bad_path_rejected() {
        let err = derive_from_mnemonic(ABANDON, "", "not/a/path", Wordlist::English).unwrap_err();
        assert!(matches!(err, DerivationError::InvalidDerivationPath { .. }));
    }

    #[test]
    fn mnemonic_info_recorded() {
        let km = derive_from_mnemonic(ABANDON, "pw", DEFAULT_DERIVATION_PATH, Wordlist::English)
            .unwrap();
        let info = km.mnemonic_info().unwrap();
        assert_eq!(info.phrase, ABANDON.split_whitespace().collect::<Vec<_>>().join(" "));
        assert_eq!(info.password, "pw");
        assert_eq!(info.path, DEFAULT_DERIVATION_PATH);
        assert_eq!(info.locale, Wordlist::English);
        assert_eq!(km.path(), DEFAULT_DERIVATION_PATH);
    }

    #[test]
    fn random_keys_are_fresh_and_rederivable() {
        let a = derive_random("", DEFAULT_DERIVATION_PATH, Wordlist::English).unwrap();
        let b = derive_random("", DEFAULT_DERIVATION_PATH, Wordlist::English).unwrap();
        assert_ne!(a.public_key(), b.public_key());

        let info = a.mnemonic_info().unwrap();
        assert_eq!(info.phrase.split(' ').count(), 12);
        let again = derive_from_mnemonic(&info.phrase, &info.password, &info.path, info.locale)
            .unwrap();
        assert_eq!(again.address(), a.address());
    }

    #[test]
    fn random_in_other_language_rederives() {
        let km = derive_random("secret", DEFAULT_DERIVATION_PATH, Wordlist::French).unwrap();
        let info = km.mnemonic_info().unwrap();
        assert_eq!(info.locale, Wordlist::French);
        let again = derive_from_mnemonic(&info.phrase, "secret", &info.path, Wordlist::French)
            .unwrap();
        assert_eq!(again.public_key(), km.public_key());
    }

    #[test]
    fn config_controls_word_count() {
        let cfg = IdentityConfig {
            mnemonic_words: 24,
            ..IdentityConfig::default()
        };
        let km = derive_random_with_config("", &cfg).unwrap();
        assert_eq!(km.mnemonic_info().unwrap().phrase.split(' ').count(), 24);
    }

    #[test]
    fn imported_key_has_no_mnemonic() {
        let km = KeyMaterial::from_private_key_hex(
            "1ab42cc412b618bdea3a599e3c9bae199ebf030895b039e9db1e30dafb12b727",
        )
        .unwrap();
        assert!(km.mnemonic_info().is_none());
        assert_eq!(km.path(), "");
        assert_eq!(km.address(), "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
    }

    #[test]
    fn debug_hides_secrets() {
        let km = derive_from_mnemonic(ABANDON, "hunter2", DEFAULT_DERIVATION_PATH, Wordlist::English)
            .unwrap();
        let debug = format!("{:?} {:?}", km, km.mnemonic_info().unwrap());
        assert!(!debug.contains("abandon"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains(&hex::encode(km.private_key())));
    }
}
