//! EIP-155 chain identifiers.
//!
//! Payment paths and token metadata refer to chains by their numeric EIP-155
//! id. A [`ChainId`] parses from decimal (`"8453"`) or `0x`-prefixed hex
//! (`"0x2105"`) and always renders as decimal.
//!
//! # Serialization
//!
//! Serializes to/from a decimal string: `"8453"`. Deserialization also
//! accepts the hex form and bare JSON integers.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::str::FromStr;

/// A numeric EIP-155 chain identifier (e.g. `1` for Ethereum, `8453` for Base).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(u64);

impl ChainId {
    /// Creates a chain id from its numeric value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Formats the chain id as a CAIP-2 identifier, e.g. `eip155:8453`.
    #[must_use]
    pub fn caip2(&self) -> String {
        format!("eip155:{}", self.0)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChainId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<ChainId> for u64 {
    fn from(value: ChainId) -> Self {
        value.0
    }
}

impl From<ChainId> for String {
    fn from(value: ChainId) -> Self {
        value.to_string()
    }
}

/// Error returned when parsing an invalid chain id string.
///
/// A valid chain id is a non-empty decimal number or a `0x`-prefixed hex number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid chain id format {0}")]
pub struct ChainIdFormatError(pub String);

impl FromStr for ChainId {
    type Err = ChainIdFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) if !hex.is_empty() => u64::from_str_radix(hex, 16).ok(),
            Some(_) => None,
            None if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) => {
                trimmed.parse().ok()
            }
            None => None,
        };
        parsed
            .map(Self)
            .ok_or_else(|| ChainIdFormatError(s.into()))
    }
}

impl Serialize for ChainId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(id) => Ok(Self(id)),
            Repr::Text(s) => Self::from_str(&s).map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_parse_decimal() {
        assert_eq!("8453".parse::<ChainId>().unwrap(), ChainId::new(8453));
        assert_eq!("1".parse::<ChainId>().unwrap(), ChainId::new(1));
    }

    #[test]
    fn test_chain_id_parse_hex() {
        assert_eq!("0x1".parse::<ChainId>().unwrap(), ChainId::new(1));
        assert_eq!("0x2105".parse::<ChainId>().unwrap(), ChainId::new(8453));
        assert_eq!("0xA4B1".parse::<ChainId>().unwrap(), ChainId::new(42161));
    }

    #[test]
    fn test_chain_id_parse_invalid() {
        for input in ["", "0x", "base", "-1", "1.5", "0xzz", "99999999999999999999999"] {
            assert!(input.parse::<ChainId>().is_err(), "{input}");
        }
    }

    #[test]
    fn test_chain_id_serialize() {
        let serialized = serde_json::to_string(&ChainId::new(42161)).unwrap();
        assert_eq!(serialized, "\"42161\"");
    }

    #[test]
    fn test_chain_id_deserialize_variants() {
        let from_str: ChainId = serde_json::from_str("\"10\"").unwrap();
        let from_hex: ChainId = serde_json::from_str("\"0xa\"").unwrap();
        let from_num: ChainId = serde_json::from_str("10").unwrap();
        assert_eq!(from_str, ChainId::new(10));
        assert_eq!(from_hex, ChainId::new(10));
        assert_eq!(from_num, ChainId::new(10));
    }

    #[test]
    fn test_chain_id_deserialize_invalid_format() {
        let result: Result<ChainId, _> = serde_json::from_str("\"invalid\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_chain_id_caip2() {
        assert_eq!(ChainId::new(8453).caip2(), "eip155:8453");
    }
}
