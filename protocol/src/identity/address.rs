//! Account address derivation.
//!
//! The wallet address attached to an identity is the standard EVM account
//! address of its public key:
//!
//! ```text
//! uncompressed_pubkey (65 bytes) -> drop 0x04 prefix -> Keccak-256
//!     -> last 20 bytes -> EIP-55 mixed-case hex -> "0x..."
//! ```
//!
//! EIP-55 hides a checksum in the letter case of the hex digits, so a
//! mistyped address is caught without changing its length or alphabet.

use crate::config::ADDRESS_LENGTH;
use crate::crypto::hash::keccak256;
use crate::crypto::keys::{KeyError, SidPublicKey};

/// Derive the EIP-55 checksummed address for a public key.
pub fn compute_address(public_key: &SidPublicKey) -> Result<String, KeyError> {
    let uncompressed = public_key.to_uncompressed()?;
    let hash = keccak256(&uncompressed[1..]);
    let mut raw = [0u8; ADDRESS_LENGTH];
    raw.copy_from_slice(&hash[32 - ADDRESS_LENGTH..]);
    Ok(to_checksum_address(&raw))
}

/// Render 20 raw address bytes as an EIP-55 string.
pub fn to_checksum_address(raw: &[u8; ADDRESS_LENGTH]) -> String {
    let lower = hex::encode(raw);
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(2 + 2 * ADDRESS_LENGTH);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        // Nibble i of the hash decides the case of hex digit i.
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Check that an address string carries a valid EIP-55 checksum.
///
/// All-lowercase and all-uppercase addresses carry no checksum and are
/// accepted as-is, matching how wallets treat them.
pub fn is_valid_address(address: &str) -> bool {
    let Some(body) = address.strip_prefix("0x") else {
        return false;
    };
    if body.len() != 2 * ADDRESS_LENGTH {
        return false;
    }
    let Ok(bytes) = hex::decode(body) else {
        return false;
    };
    let mut raw = [0u8; ADDRESS_LENGTH];
    raw.copy_from_slice(&bytes);

    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    if !(has_lower && has_upper) {
        return true;
    }
    to_checksum_address(&raw) == address
}
