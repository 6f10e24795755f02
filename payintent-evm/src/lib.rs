#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! EIP-155 (EVM) support for payment intents.
//!
//! # Modules
//!
//! - [`networks`] - Known EVM networks, their name variants and USDC deployments
//! - [`rpc`] - JSON-RPC transport with ranked endpoint fallback and a per-chain client cache
//! - [`ens`] - ENS [`NameResolver`](payintent::resolve::NameResolver) built on [`rpc`]
//!
//! # Feature Flags
//!
//! - `telemetry` - Tracing of RPC failover and ENS lookups

pub mod ens;
pub mod networks;
pub mod rpc;

pub use ens::EnsResolver;
pub use networks::{EVM_NETWORKS, evm_network_registry};
pub use rpc::{RpcClient, RpcClientCache, RpcError};
