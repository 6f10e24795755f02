//! Known EVM networks, their name variants and USDC deployments.

use alloy_primitives::{Address, address};
use payintent::chain::ChainId;
use payintent::networks::{NetworkInfo, NetworkRegistry};
use payintent::quote::TokenRef;

/// Ethereum Mainnet chain ID.
pub const ETHEREUM_MAINNET: ChainId = ChainId::new(1);

/// Optimism chain ID.
pub const OPTIMISM_MAINNET: ChainId = ChainId::new(10);

/// BNB Smart Chain chain ID.
pub const BNB_MAINNET: ChainId = ChainId::new(56);

/// Gnosis chain ID.
pub const GNOSIS_MAINNET: ChainId = ChainId::new(100);

/// Polygon Mainnet chain ID.
pub const POLYGON_MAINNET: ChainId = ChainId::new(137);

/// Base Mainnet chain ID.
pub const BASE_MAINNET: ChainId = ChainId::new(8453);

/// Arbitrum One chain ID.
pub const ARBITRUM_MAINNET: ChainId = ChainId::new(42161);

/// Celo Mainnet chain ID.
pub const CELO_MAINNET: ChainId = ChainId::new(42220);

/// Avalanche C-Chain chain ID.
pub const AVALANCHE_MAINNET: ChainId = ChainId::new(43114);

/// Linea Mainnet chain ID.
pub const LINEA_MAINNET: ChainId = ChainId::new(59144);

/// Scroll Mainnet chain ID.
pub const SCROLL_MAINNET: ChainId = ChainId::new(534_352);

/// USDC contract address on Ethereum Mainnet.
pub const USDC_ETHEREUM: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");

/// USDC contract address on Optimism.
pub const USDC_OPTIMISM: Address = address!("0b2C639c533813f4Aa9D7837CAf62653d097Ff85");

/// Binance-Peg USDC contract address on BNB Smart Chain (18 decimals).
pub const USDC_BNB: Address = address!("8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d");

/// Bridged USDC.e contract address on Gnosis.
pub const USDC_GNOSIS: Address = address!("2a22f9c3b484c3629090FeED35F17Ff8F88f76F0");

/// USDC contract address on Polygon Mainnet.
pub const USDC_POLYGON: Address = address!("3c499c542cEF5E3811e1192ce70d8cC03d5c3359");

/// USDC contract address on Base Mainnet.
pub const USDC_BASE: Address = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");

/// USDC contract address on Arbitrum One.
pub const USDC_ARBITRUM: Address = address!("af88d065e77c8cC2239327C5EDb3A432268e5831");

/// USDC contract address on Celo.
pub const USDC_CELO: Address = address!("cebA9300f2b948710d2653dD7B07f33A8B32118C");

/// USDC contract address on Avalanche C-Chain.
pub const USDC_AVALANCHE: Address = address!("B97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E");

/// USDC contract address on Linea.
pub const USDC_LINEA: Address = address!("176211869cA2b568f2A7D4EE941E073a821EE1ff");

/// USDC contract address on Scroll.
pub const USDC_SCROLL: Address = address!("06eFdBFf2a14a7c8E15944D1F4A48F9F95F663A4");

/// Default token decimals for USDC.
pub const DEFAULT_USDC_DECIMALS: u8 = 6;

/// Decimals of every EVM native asset.
pub const NATIVE_DECIMALS: u8 = 18;

/// Known EVM networks with the name variants accepted in `@chain` qualifiers.
pub const EVM_NETWORKS: &[NetworkInfo] = &[
    NetworkInfo {
        name: "Ethereum",
        chain_id: ETHEREUM_MAINNET.as_u64(),
        aliases: &["eth", "ethereum", "mainnet"],
    },
    NetworkInfo {
        name: "Optimism",
        chain_id: OPTIMISM_MAINNET.as_u64(),
        aliases: &["optimism", "op"],
    },
    NetworkInfo {
        name: "BNB Smart Chain",
        chain_id: BNB_MAINNET.as_u64(),
        aliases: &["bnb", "bsc", "binance"],
    },
    NetworkInfo {
        name: "Gnosis",
        chain_id: GNOSIS_MAINNET.as_u64(),
        aliases: &["gnosis", "xdai"],
    },
    NetworkInfo {
        name: "Polygon",
        chain_id: POLYGON_MAINNET.as_u64(),
        aliases: &["polygon", "matic", "pol"],
    },
    NetworkInfo {
        name: "Base",
        chain_id: BASE_MAINNET.as_u64(),
        aliases: &["base"],
    },
    NetworkInfo {
        name: "Arbitrum One",
        chain_id: ARBITRUM_MAINNET.as_u64(),
        aliases: &["arbitrum", "arb", "arbitrum-one"],
    },
    NetworkInfo {
        name: "Celo",
        chain_id: CELO_MAINNET.as_u64(),
        aliases: &["celo"],
    },
    NetworkInfo {
        name: "Avalanche",
        chain_id: AVALANCHE_MAINNET.as_u64(),
        aliases: &["avalanche", "avax"],
    },
    NetworkInfo {
        name: "Linea",
        chain_id: LINEA_MAINNET.as_u64(),
        aliases: &["linea"],
    },
    NetworkInfo {
        name: "Scroll",
        chain_id: SCROLL_MAINNET.as_u64(),
        aliases: &["scroll"],
    },
];

/// USDC deployments on the known networks.
pub const USDC_DEPLOYMENTS: &[TokenRef] = &[
    usdc(ETHEREUM_MAINNET, USDC_ETHEREUM),
    usdc(OPTIMISM_MAINNET, USDC_OPTIMISM),
    TokenRef {
        chain_id: BNB_MAINNET,
        address: USDC_BNB,
        decimals: 18,
    },
    usdc(GNOSIS_MAINNET, USDC_GNOSIS),
    usdc(POLYGON_MAINNET, USDC_POLYGON),
    usdc(BASE_MAINNET, USDC_BASE),
    usdc(ARBITRUM_MAINNET, USDC_ARBITRUM),
    usdc(CELO_MAINNET, USDC_CELO),
    usdc(AVALANCHE_MAINNET, USDC_AVALANCHE),
    usdc(LINEA_MAINNET, USDC_LINEA),
    usdc(SCROLL_MAINNET, USDC_SCROLL),
];

const fn usdc(chain_id: ChainId, address: Address) -> TokenRef {
    TokenRef {
        chain_id,
        address,
        decimals: DEFAULT_USDC_DECIMALS,
    }
}

/// Returns a [`NetworkRegistry`] holding [`EVM_NETWORKS`].
#[must_use]
pub fn evm_network_registry() -> NetworkRegistry {
    NetworkRegistry::from_networks(EVM_NETWORKS)
}

/// Returns the USDC deployment on `chain_id`, if known.
#[must_use]
pub fn usdc_deployment(chain_id: ChainId) -> Option<TokenRef> {
    USDC_DEPLOYMENTS
        .iter()
        .find(|token| token.chain_id == chain_id)
        .copied()
}

/// Returns the native asset of `chain_id` as a quotable token.
///
/// The zero address stands for the native asset; the quote calculator swaps
/// it for the configured native sentinel before pricing.
#[must_use]
pub const fn native_token(chain_id: ChainId) -> TokenRef {
    TokenRef {
        chain_id,
        address: Address::ZERO,
        decimals: NATIVE_DECIMALS,
    }
}
