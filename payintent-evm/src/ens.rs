//! ENS name resolution over the JSON-RPC transport.
//!
//! Resolution is two `eth_call`s on Ethereum mainnet: ask the registry for
//! the name's resolver, then ask that resolver for the address. A zero
//! answer at either step means the name has no address record.

use std::sync::Arc;

use alloy_primitives::{Address, B256, Bytes, address, keccak256};
use alloy_sol_types::{SolCall, sol};
use async_trait::async_trait;
use payintent::chain::ChainId;
use payintent::error::LookupError;
use payintent::resolve::{Lookup, NameResolver};

use crate::networks::ETHEREUM_MAINNET;
use crate::rpc::{RpcClientCache, RpcError};

/// ENS registry, deployed at the same address on mainnet and testnets.
pub const ENS_REGISTRY: Address = address!("00000000000C2E074eC69A0bFb2997BA6C7d2e1e");

sol! {
    /// Minimal ENS registry interface.
    #[allow(missing_docs)]
    interface IEnsRegistry {
        function resolver(bytes32 node) external view returns (address);
    }

    /// Minimal ENS public resolver interface.
    #[allow(missing_docs)]
    interface IAddrResolver {
        function addr(bytes32 node) external view returns (address);
    }
}

/// Computes the EIP-137 namehash of `name`. Labels are lower-cased first.
#[must_use]
pub fn namehash(name: &str) -> B256 {
    let name = name.to_lowercase();
    if name.is_empty() {
        return B256::ZERO;
    }
    name.rsplit('.').fold(B256::ZERO, |node, label| {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(keccak256(label.as_bytes()).as_slice());
        keccak256(buf)
    })
}

/// Resolves ENS names through an [`RpcClientCache`].
#[derive(Debug, Clone)]
pub struct EnsResolver {
    clients: Arc<RpcClientCache>,
    chain_id: ChainId,
    registry: Address,
}

impl EnsResolver {
    /// Creates a resolver against the mainnet registry.
    #[must_use]
    pub const fn new(clients: Arc<RpcClientCache>) -> Self {
        Self {
            clients,
            chain_id: ETHEREUM_MAINNET,
            registry: ENS_REGISTRY,
        }
    }

    /// Points the resolver at another chain and registry deployment.
    #[must_use]
    pub const fn with_registry(mut self, chain_id: ChainId, registry: Address) -> Self {
        self.chain_id = chain_id;
        self.registry = registry;
        self
    }

    /// Resolves `name`, reporting RPC failures as [`RpcError`].
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] if the chain has no endpoints or every endpoint failed.
    pub async fn lookup(&self, name: &str) -> Result<Lookup<Address>, RpcError> {
        let client = self.clients.get_or_create(self.chain_id)?;
        let node = namehash(name);

        let call = IEnsRegistry::resolverCall { node };
        let returned = client
            .eth_call(self.registry, Bytes::from(call.abi_encode()))
            .await?;
        let resolver = decode_address(&returned)?;
        if resolver == Address::ZERO {
            return Ok(Lookup::NotFound);
        }

        let call = IAddrResolver::addrCall { node };
        let returned = client
            .eth_call(resolver, Bytes::from(call.abi_encode()))
            .await?;
        let resolved = decode_address(&returned)?;
        Ok(if resolved == Address::ZERO {
            Lookup::NotFound
        } else {
            Lookup::Found(resolved)
        })
    }
}

/// Decodes a single ABI-encoded `address` return value.
///
/// Empty return data (no contract at the target) decodes as the zero address.
fn decode_address(returned: &[u8]) -> Result<Address, RpcError> {
    if returned.is_empty() {
        return Ok(Address::ZERO);
    }
    if returned.len() < 32 {
        return Err(RpcError::Decode(format!(
            "expected 32 bytes of return data, got {}",
            returned.len()
        )));
    }
    Ok(Address::from_slice(&returned[12..32]))
}

#[async_trait]
impl NameResolver for EnsResolver {
    #[cfg_attr(
        feature = "telemetry",
        tracing::instrument(name = "payintent_evm.ens", skip(self), err)
    )]
    async fn resolve_name(&self, name: &str) -> Result<Lookup<Address>, LookupError> {
        Ok(self.lookup(name).await?)
    }
}
