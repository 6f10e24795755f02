//! Network name registry.
//!
//! Payment paths name chains loosely: `alice@arb`, `0xabc..@0xa4b1`,
//! `bob.eth@Base`. This module maps those qualifiers to a [`ChainId`].
//!
//! Concrete network data lives in chain-specific crates (`payintent-evm`
//! provides `EVM_NETWORKS`). Applications assemble a [`NetworkRegistry`]
//! from such slices at startup.

use std::collections::HashMap;

use crate::chain::ChainId;

/// A known network with its canonical name and accepted name variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkInfo {
    /// Human-readable name (e.g. "Arbitrum One").
    pub name: &'static str,
    /// EIP-155 chain id.
    pub chain_id: u64,
    /// Lower-case name variants accepted in payment paths (e.g. `["arbitrum", "arb"]`).
    pub aliases: &'static [&'static str],
}

impl NetworkInfo {
    /// Returns the [`ChainId`] of this network.
    #[must_use]
    pub const fn chain_id(&self) -> ChainId {
        ChainId::new(self.chain_id)
    }
}

/// A chain qualifier that does not name a registered network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Chain {0} is either not supported or invalid")]
pub struct ChainResolveError(pub String);

/// Registry that maps name variants to [`ChainId`] values and vice versa.
///
/// # Example
///
/// ```ignore
/// use payintent::networks::NetworkRegistry;
///
/// let registry = NetworkRegistry::from_networks(payintent_evm::EVM_NETWORKS);
/// let arbitrum = registry.resolve_chain("arb")?;
/// assert_eq!(registry.name_by_chain_id(arbitrum), Some("Arbitrum One"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    alias_to_chain_id: HashMap<&'static str, ChainId>,
    chain_id_to_name: HashMap<ChainId, &'static str>,
}

impl NetworkRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated from a network info slice.
    #[must_use]
    pub fn from_networks(networks: &[NetworkInfo]) -> Self {
        let mut registry = Self::new();
        registry.register(networks);
        registry
    }

    /// Registers additional networks into this registry.
    ///
    /// Later registrations win for both aliases and names.
    pub fn register(&mut self, networks: &[NetworkInfo]) {
        for info in networks {
            for alias in info.aliases {
                self.alias_to_chain_id.insert(alias, info.chain_id());
            }
            self.chain_id_to_name.insert(info.chain_id(), info.name);
        }
    }

    /// Builder-style method: registers additional networks and returns `self`.
    #[must_use]
    pub fn with_networks(mut self, networks: &[NetworkInfo]) -> Self {
        self.register(networks);
        self
    }

    /// Looks up a chain by one of its name variants, ignoring ASCII case.
    #[must_use]
    pub fn chain_id_by_name(&self, name: &str) -> Option<ChainId> {
        self.alias_to_chain_id
            .get(name.to_ascii_lowercase().as_str())
            .copied()
    }

    /// Looks up the human-readable name of a chain.
    #[must_use]
    pub fn name_by_chain_id(&self, chain_id: ChainId) -> Option<&'static str> {
        self.chain_id_to_name.get(&chain_id).copied()
    }

    /// Returns `true` if the chain is registered.
    #[must_use]
    pub fn is_supported(&self, chain_id: ChainId) -> bool {
        self.chain_id_to_name.contains_key(&chain_id)
    }

    /// Resolves a chain qualifier given as a name variant, decimal id or hex id.
    ///
    /// # Errors
    ///
    /// Returns [`ChainResolveError`] if the qualifier does not name a registered chain.
    pub fn resolve_chain(&self, identifier: &str) -> Result<ChainId, ChainResolveError> {
        let identifier = identifier.trim();
        if let Some(chain_id) = self.chain_id_by_name(identifier) {
            return Ok(chain_id);
        }
        identifier
            .parse::<ChainId>()
            .ok()
            .filter(|chain_id| self.is_supported(*chain_id))
            .ok_or_else(|| ChainResolveError(identifier.to_owned()))
    }

    /// Returns the number of registered networks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chain_id_to_name.len()
    }

    /// Returns `true` if no networks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chain_id_to_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_NETWORKS: &[NetworkInfo] = &[
        NetworkInfo {
            name: "Ethereum",
            chain_id: 1,
            aliases: &["eth", "ethereum", "mainnet"],
        },
        NetworkInfo {
            name: "OP Mainnet",
            chain_id: 10,
            aliases: &["optimism", "op"],
        },
        NetworkInfo {
            name: "Base",
            chain_id: 8453,
            aliases: &["base"],
        },
    ];

    fn registry() -> NetworkRegistry {
        NetworkRegistry::from_networks(TEST_NETWORKS)
    }

    #[test]
    fn test_resolve_chain_by_name() {
        let registry = registry();
        assert_eq!(registry.resolve_chain("ethereum").unwrap(), ChainId::new(1));
        assert_eq!(registry.resolve_chain("op").unwrap(), ChainId::new(10));
        assert_eq!(registry.resolve_chain("base").unwrap(), ChainId::new(8453));
    }

    #[test]
    fn test_resolve_chain_case_insensitive() {
        let registry = registry();
        assert_eq!(registry.resolve_chain("ETHEREUM").unwrap(), ChainId::new(1));
        assert_eq!(registry.resolve_chain("EthereUM").unwrap(), ChainId::new(1));
    }

    #[test]
    fn test_resolve_chain_by_decimal_and_hex_id() {
        let registry = registry();
        assert_eq!(registry.resolve_chain("1").unwrap(), ChainId::new(1));
        assert_eq!(registry.resolve_chain("0x1").unwrap(), ChainId::new(1));
        assert_eq!(registry.resolve_chain("0xa").unwrap(), ChainId::new(10));
    }

    #[test]
    fn test_resolve_chain_unsupported() {
        let registry = registry();
        assert!(registry.resolve_chain("invalid").is_err());
        assert!(registry.resolve_chain("999").is_err());
        let err = registry.resolve_chain("solana").unwrap_err();
        assert_eq!(err.to_string(), "Chain solana is either not supported or invalid");
    }

    #[test]
    fn test_name_by_chain_id() {
        let registry = registry();
        assert_eq!(registry.name_by_chain_id(ChainId::new(10)), Some("OP Mainnet"));
        assert_eq!(registry.name_by_chain_id(ChainId::new(137)), None);
        assert_eq!(registry.len(), 3);
        assert!(!registry.is_empty());
    }
}
