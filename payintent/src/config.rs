//! Configuration for payment intent resolution.
//!
//! Everything that would otherwise be a hidden constant (name-service
//! suffixes, the default slippage, which account types can receive funds,
//! the platform wallet's chain and token) lives in [`IntentConfig`] and is
//! handed to components explicitly.
//!
//! # Example
//!
//! ```rust
//! use payintent::config::IntentConfig;
//!
//! let config: IntentConfig = serde_json::from_value(serde_json::json!({
//!     "nameServiceSuffixes": [".eth", ".base.eth"],
//!     "defaultSlippagePercentage": "0.3",
//! }))
//! .unwrap();
//! assert_eq!(config.wallet_token, "usdc");
//! ```

use alloy_primitives::{Address, address};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::chain::ChainId;

/// Pseudo-address that price and routing services use for a chain's native asset.
pub const NATIVE_TOKEN_ADDRESS: Address = address!("0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Account type under which the platform registers a user's own wallet.
pub const DEFAULT_WALLET_ACCOUNT_TYPE: &str = "peanut-wallet";

/// Arbitrum One, where platform wallets live.
pub const DEFAULT_WALLET_CHAIN_ID: ChainId = ChainId::new(42161);

/// Intent resolution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntentConfig {
    /// Suffixes that mark an identifier as a name-service name (e.g. `".eth"`).
    pub name_service_suffixes: Vec<String>,

    /// Slippage applied to cross-chain quotes when the caller gives none.
    pub default_slippage_percentage: Decimal,

    /// Directory account types that may receive funds for a username.
    /// Earlier entries take precedence.
    pub eligible_account_types: Vec<String>,

    /// Chain every username payment settles on.
    pub wallet_chain_id: ChainId,

    /// Token every username payment settles in.
    pub wallet_token: String,

    /// Lower-case token symbols accepted in payment paths.
    /// An empty list accepts any symbol.
    pub supported_tokens: Vec<String>,

    /// Address substituted for the zero address before price lookups.
    pub native_token_address: Address,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            name_service_suffixes: vec![".eth".to_owned()],
            default_slippage_percentage: Decimal::new(5, 1),
            eligible_account_types: vec![DEFAULT_WALLET_ACCOUNT_TYPE.to_owned()],
            wallet_chain_id: DEFAULT_WALLET_CHAIN_ID,
            wallet_token: "usdc".to_owned(),
            supported_tokens: [
                "usdc", "usdt", "dai", "eth", "weth", "wbtc", "matic", "pol", "op", "arb", "bnb",
                "avax", "xdai", "celo",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
            native_token_address: NATIVE_TOKEN_ADDRESS,
        }
    }
}

impl IntentConfig {
    /// Returns `true` if `symbol` may appear in a payment path.
    #[must_use]
    pub fn is_supported_token(&self, symbol: &str) -> bool {
        self.supported_tokens.is_empty()
            || self
                .supported_tokens
                .iter()
                .any(|t| t.eq_ignore_ascii_case(symbol))
    }
}
