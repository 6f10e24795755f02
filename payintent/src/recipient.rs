//! Recipient classification.
//!
//! Labels a raw identifier as an address, a name-service name or a platform
//! username using structural rules only. Classification is total and never
//! performs I/O.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::config::IntentConfig;

/// The kind of recipient an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecipientKind {
    /// A 20-byte hex address.
    #[serde(rename = "ADDRESS")]
    Address,
    /// A name-service name such as `vitalik.eth`.
    #[serde(rename = "ENS_NAME", alias = "ENS")]
    EnsName,
    /// A platform username.
    #[serde(rename = "USERNAME")]
    Username,
}

impl fmt::Display for RecipientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address => f.write_str("ADDRESS"),
            Self::EnsName => f.write_str("ENS_NAME"),
            Self::Username => f.write_str("USERNAME"),
        }
    }
}

/// Returns `true` for `0x` followed by exactly 40 hex digits, in any case.
///
/// The EIP-55 checksum is not enforced.
#[must_use]
pub fn is_address(identifier: &str) -> bool {
    identifier
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// Returns `true` if `identifier` starts with `0x` or `0X`.
#[must_use]
pub fn has_hex_prefix(identifier: &str) -> bool {
    identifier
        .get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("0x"))
}

/// Parses a structurally valid address; see [`is_address`].
#[must_use]
pub fn parse_address(identifier: &str) -> Option<Address> {
    if is_address(identifier) {
        Address::from_str(identifier).ok()
    } else {
        None
    }
}

/// Formats an address as lower-case `0x`-prefixed hex.
#[must_use]
pub fn lowercase_hex(address: &Address) -> String {
    format!("{address:#x}")
}

/// Classifies recipient identifiers against a configured suffix list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientClassifier {
    suffixes: Vec<String>,
}

impl Default for RecipientClassifier {
    fn default() -> Self {
        Self::new([".eth"])
    }
}

impl RecipientClassifier {
    /// Creates a classifier that recognizes the given name-service suffixes.
    ///
    /// Suffixes are matched ignoring ASCII case; a leading `.` is added if missing.
    #[must_use]
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let suffixes = suffixes
            .into_iter()
            .map(|s| {
                let s = s.as_ref().to_ascii_lowercase();
                if s.starts_with('.') { s } else { format!(".{s}") }
            })
            .collect();
        Self { suffixes }
    }

    /// Creates a classifier from [`IntentConfig::name_service_suffixes`].
    #[must_use]
    pub fn from_config(config: &IntentConfig) -> Self {
        Self::new(&config.name_service_suffixes)
    }

    /// Returns the recognized suffixes.
    #[must_use]
    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Returns `true` if `identifier` is a dotted name ending in a recognized
    /// suffix with at least one non-empty label in front of it.
    #[must_use]
    pub fn is_name(&self, identifier: &str) -> bool {
        let lower = identifier.to_ascii_lowercase();
        self.suffixes.iter().any(|suffix| {
            lower
                .strip_suffix(suffix.as_str())
                .is_some_and(|labels| !labels.is_empty() && labels.split('.').all(|l| !l.is_empty()))
        })
    }

    /// Classifies an identifier.
    ///
    /// Checks run in priority order: address, then name-service name, then username.
    #[must_use]
    pub fn classify(&self, identifier: &str) -> RecipientKind {
        if is_address(identifier) {
            RecipientKind::Address
        } else if self.is_name(identifier) {
            RecipientKind::EnsName
        } else {
            RecipientKind::Username
        }
    }

    /// Classifies an identifier for an external withdrawal.
    ///
    /// Withdrawals never target platform usernames, so anything that is not
    /// an address is treated as a name-service name.
    #[must_use]
    pub fn classify_for_withdrawal(&self, identifier: &str) -> RecipientKind {
        if is_address(identifier) {
            RecipientKind::Address
        } else {
            RecipientKind::EnsName
        }
    }
}

/// Classifies an identifier with the default `.eth` suffix.
#[must_use]
pub fn classify(identifier: &str) -> RecipientKind {
    RecipientClassifier::default().classify(identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_address() {
        assert_eq!(classify(&format!("0x{}", "a".repeat(40))), RecipientKind::Address);
        assert_eq!(
            classify("0x1234567890123456789012345678901234567890"),
            RecipientKind::Address
        );
        assert_eq!(
            classify("0x0fdaEB9903A291aB8450DFA25B3fa962E075547A"),
            RecipientKind::Address
        );
    }

    #[test]
    fn test_classify_ens() {
        assert_eq!(classify("vitalik.eth"), RecipientKind::EnsName);
        assert_eq!(classify("user.subdomain.eth"), RecipientKind::EnsName);
        assert_eq!(classify("Vitalik.ETH"), RecipientKind::EnsName);
    }

    #[test]
    fn test_classify_username() {
        assert_eq!(classify("kusharc"), RecipientKind::Username);
        assert_eq!(classify(".eth"), RecipientKind::Username);
        assert_eq!(classify("a..eth"), RecipientKind::Username);
        assert_eq!(classify("0xinvalid"), RecipientKind::Username);
        assert_eq!(classify(&format!("0x{}", "g".repeat(40))), RecipientKind::Username);
        assert_eq!(classify(&"a".repeat(40)), RecipientKind::Username);
    }

    #[test]
    fn test_classify_custom_suffixes() {
        let classifier = RecipientClassifier::new(["base.eth", ".xyz"]);
        assert_eq!(classifier.classify("jesse.base.eth"), RecipientKind::EnsName);
        assert_eq!(classifier.classify("alice.xyz"), RecipientKind::EnsName);
        assert_eq!(classifier.classify("vitalik.eth"), RecipientKind::Username);
    }

    #[test]
    fn test_classify_for_withdrawal() {
        let classifier = RecipientClassifier::default();
        assert_eq!(classifier.classify_for_withdrawal("kusharc"), RecipientKind::EnsName);
        assert_eq!(classifier.classify_for_withdrawal("vitalik.eth"), RecipientKind::EnsName);
        assert_eq!(
            classifier.classify_for_withdrawal("0x1234567890123456789012345678901234567890"),
            RecipientKind::Address
        );
    }

    #[test]
    fn test_lowercase_hex() {
        let address = parse_address("0x0fdaEB9903A291aB8450DFA25B3fa962E075547A").unwrap();
        assert_eq!(
            lowercase_hex(&address),
            "0x0fdaeb9903a291ab8450dfa25b3fa962e075547a"
        );
        assert!(parse_address("0x123").is_none());
    }

    #[test]
    fn test_recipient_kind_serde() {
        assert_eq!(
            serde_json::to_string(&RecipientKind::EnsName).unwrap(),
            "\"ENS_NAME\""
        );
        let kind: RecipientKind = serde_json::from_str("\"USERNAME\"").unwrap();
        assert_eq!(kind, RecipientKind::Username);
        let kind: RecipientKind = serde_json::from_str("\"ENS\"").unwrap();
        assert_eq!(kind, RecipientKind::EnsName);
    }
}
