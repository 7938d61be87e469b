//! BIP-39 wordlist selection by locale code.
//!
//! Mnemonics are only portable if both ends agree on the wordlist, so the
//! locale a phrase was generated under is recorded in its `MnemonicInfo`.
//! Lookup is lenient: an unknown code falls back to English with a warning
//! rather than failing the derivation. Callers that would rather reject the
//! code can use [`Wordlist::from_code`] directly.

use bip39::Language;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// The supported BIP-39 wordlists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Wordlist {
    #[default]
    English,
    ChineseSimplified,
    ChineseTraditional,
    Czech,
    French,
    Italian,
    Japanese,
    Korean,
    Portuguese,
    Spanish,
}

impl Wordlist {
    /// Every supported list, in a stable order.
    pub const ALL: [Wordlist; 10] = [
        Wordlist::English,
        Wordlist::ChineseSimplified,
        Wordlist::ChineseTraditional,
        Wordlist::Czech,
        Wordlist::French,
        Wordlist::Italian,
        Wordlist::Japanese,
        Wordlist::Korean,
        Wordlist::Portuguese,
        Wordlist::Spanish,
    ];

    /// Strict lookup. Codes are case-insensitive and `zh-CN` equals `zh_cn`.
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.trim().to_ascii_lowercase().replace('-', "_");
        let list = match normalized.as_str() {
            "en" => Wordlist::English,
            "zh_cn" | "zh_hans" => Wordlist::ChineseSimplified,
            "zh_tw" | "zh_hant" => Wordlist::ChineseTraditional,
            "cs" => Wordlist::Czech,
            "fr" => Wordlist::French,
            "it" => Wordlist::Italian,
            "ja" => Wordlist::Japanese,
            "ko" => Wordlist::Korean,
            "pt" => Wordlist::Portuguese,
            "es" => Wordlist::Spanish,
            _ => return None,
        };
        Some(list)
    }

    /// Lenient lookup: unknown codes resolve to the default list.
    pub fn lookup(code: &str) -> Self {
        match Self::from_code(code) {
            Some(list) => list,
            None => {
                warn!(locale = code, "unknown wordlist locale, falling back to English");
                Wordlist::default()
            }
        }
    }

    /// Canonical locale code for this list.
    pub fn code(&self) -> &'static str {
        match self {
            Wordlist::English => "en",
            Wordlist::ChineseSimplified => "zh_cn",
            Wordlist::ChineseTraditional => "zh_tw",
            Wordlist::Czech => "cs",
            Wordlist::French => "fr",
            Wordlist::Italian => "it",
            Wordlist::Japanese => "ja",
            Wordlist::Korean => "ko",
            Wordlist::Portuguese => "pt",
            Wordlist::Spanish => "es",
        }
    }

    pub(crate) fn language(&self) -> Language {
        match self {
            Wordlist::English => Language::English,
            Wordlist::ChineseSimplified => Language::SimplifiedChinese,
            Wordlist::ChineseTraditional => Language::TraditionalChinese,
            Wordlist::Czech => Language::Czech,
            Wordlist::French => Language::French,
            Wordlist::Italian => Language::Italian,
            Wordlist::Japanese => Language::Japanese,
            Wordlist::Korean => Language::Korean,
            Wordlist::Portuguese => Language::Portuguese,
            Wordlist::Spanish => Language::Spanish,
        }
    }
}

impl fmt::Display for Wordlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_roundtrips() {
        for list in Wordlist::ALL {
            assert_eq!(Wordlist::from_code(list.code()), Some(list));
        }
    }

    #[test]
    fn codes_are_normalized() {
        assert_eq!(Wordlist::from_code("zh-CN"), Some(Wordlist::ChineseSimplified));
        assert_eq!(Wordlist::from_code(" EN "), Some(Wordlist::English));
        assert_eq!(Wordlist::from_code("ZH_TW"), Some(Wordlist::ChineseTraditional));
    }

    #[test]
    fn strict_lookup_rejects_unknown() {
        assert_eq!(Wordlist::from_code("klingon"), None);
        assert_eq!(Wordlist::from_code(""), None);
    }

    #[test]
    fn lenient_lookup_falls_back_to_english() {
        assert_eq!(Wordlist::lookup("klingon"), Wordlist::English);
    }

    #[test]
    fn matched_code_never_falls_through() {
        // A recognised code must yield its own list, not the default.
        assert_eq!(Wordlist::lookup("ja"), Wordlist::Japanese);
        assert_eq!(Wordlist::lookup("es"), Wordlist::Spanish);
    }

    #[test]
    fn wordlists_have_2048_words() {
        for list in Wordlist::ALL {
            assert_eq!(list.language().word_list().len(), 2048, "{list}");
        }
    }
}
