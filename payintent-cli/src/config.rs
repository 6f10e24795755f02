//! CLI configuration.
//!
//! Loads configuration from a TOML file with support for environment variable
//! expansion in string values. Variables use `$VAR` or `${VAR}` syntax.
//!
//! # Example Configuration
//!
//! ```toml
//! [intent]
//! nameServiceSuffixes = [".eth", ".base.eth"]
//! defaultSlippagePercentage = "0.5"
//!
//! [api]
//! users_base_url = "https://api.example.com"
//! prices_base_url = "https://prices.example.com/v2"
//! api_key = "$PAYINTENT_API_KEY"
//! timeout_ms = 5000
//!
//! [rpc."1"]
//! endpoints = ["https://eth.llamarpc.com", "https://${MAINNET_RPC_HOST}/v2/key"]
//! timeout_ms = 3000
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to configuration file (default: `payintent.toml`)
//! - Anything referenced by `$VAR` in the config file, including from `.env`

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use payintent::chain::ChainId;
use payintent::config::IntentConfig;
use payintent_evm::RpcClientCache;
use payintent_http::{ApiClient, HttpPriceSource, HttpUsernameDirectory};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CliError;

/// Config file used when neither `--config` nor `CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "payintent.toml";

/// Top-level CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Intent parsing, resolution and quoting settings.
    pub intent: IntentConfig,

    /// Platform API settings.
    pub api: ApiConfig,

    /// JSON-RPC endpoints keyed by chain id (decimal or `0x` hex).
    pub rpc: HashMap<String, RpcChainConfig>,
}

/// Platform API settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the users API.
    pub users_base_url: Option<String>,

    /// Base URL of the token-price API.
    pub prices_base_url: Option<String>,

    /// Value for the `api-key` header.
    /// Supports `$VAR` / `${VAR}` for environment variable expansion.
    pub api_key: Option<String>,

    /// Per-request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
}

/// Endpoints for one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcChainConfig {
    /// HTTP JSON-RPC endpoints, in preference order.
    pub endpoints: Vec<String>,

    /// Per-request timeout in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl CliConfig {
    /// Loads configuration from a specific file path.
    ///
    /// A missing file yields the defaults. All `$VAR` / `${VAR}` references
    /// are expanded from the process environment before parsing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, CliError> {
        let content = if path.exists() {
            std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            String::new()
        };

        toml::from_str(&expand_env_vars(&content)).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Builds the per-chain RPC client cache from the `[rpc]` tables.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::InvalidRpcConfig`] for a malformed chain id or endpoint URL.
    pub fn rpc_cache(&self) -> Result<RpcClientCache, CliError> {
        let mut cache = RpcClientCache::new();
        for (key, chain) in &self.rpc {
            let chain_id: ChainId = key.parse().map_err(|e| CliError::InvalidRpcConfig {
                key: key.clone(),
                message: format!("{e}"),
            })?;
            let urls = chain
                .endpoints
                .iter()
                .map(|endpoint| {
                    Url::parse(endpoint).map_err(|e| CliError::InvalidRpcConfig {
                        key: key.clone(),
                        message: format!("endpoint {endpoint:?}: {e}"),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            if urls.is_empty() {
                tracing::warn!(chain = %chain_id, "RPC chain configured without endpoints");
            }
            cache = cache.with_endpoints(chain_id, urls);
            if let Some(ms) = chain.timeout_ms {
                cache = cache.with_chain_timeout(chain_id, Duration::from_millis(ms));
            }
        }
        Ok(cache)
    }

    /// Builds the users API directory.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::MissingSetting`] if `api.users_base_url` is unset.
    pub fn users_directory(&self) -> Result<HttpUsernameDirectory, CliError> {
        let base = self
            .api
            .users_base_url
            .as_deref()
            .ok_or(CliError::MissingSetting("api.users_base_url"))?;
        Ok(HttpUsernameDirectory::new(self.api_client(base)?))
    }

    /// Builds the token-price source.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::MissingSetting`] if `api.prices_base_url` is unset.
    pub fn price_source(&self) -> Result<HttpPriceSource, CliError> {
        let base = self
            .api
            .prices_base_url
            .as_deref()
            .ok_or(CliError::MissingSetting("api.prices_base_url"))?;
        Ok(HttpPriceSource::new(self.api_client(base)?))
    }

    fn api_client(&self, base: &str) -> Result<ApiClient, CliError> {
        let mut client = ApiClient::try_from(base)?;
        if let Some(key) = self.api.api_key.as_deref().map(str::trim) {
            if key.is_empty() || key.starts_with('$') {
                tracing::warn!("api.api_key not resolved (missing env var?), sending no api-key");
            } else {
                client = client
                    .with_api_key(key)
                    .map_err(|_| CliError::InvalidApiKey)?;
            }
        }
        if let Some(ms) = self.api.timeout_ms {
            client = client.with_timeout(Duration::from_millis(ms));
        }
        Ok(client)
    }
}

/// Expands `$VAR` and `${VAR}` patterns in a string from environment variables.
///
/// Unresolved variables are left as-is.
#[must_use]
pub fn expand_env_vars(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

fn expand_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }

        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next();
        }

        let mut name = String::new();
        let mut closed = false;
        while let Some(&c) = chars.peek() {
            if braced && c == '}' {
                chars.next();
                closed = true;
                break;
            }
            if !braced && !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            name.push(c);
            chars.next();
        }

        let complete = !name.is_empty() && (closed || !braced);
        match lookup(&name) {
            Some(value) if complete => result.push_str(&value),
            _ => {
                result.push('$');
                if braced {
                    result.push('{');
                }
                result.push_str(&name);
                if closed {
                    result.push('}');
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "HOST" => Some("rpc.example.com".into()),
            "KEY" => Some("s3cret".into()),
            _ => None,
        }
    }

    #[test]
    fn test_expand_plain_and_braced() {
        assert_eq!(
            expand_with("https://${HOST}/v2/$KEY", lookup),
            "https://rpc.example.com/v2/s3cret"
        );
        assert_eq!(expand_with("$KEY-suffix", lookup), "s3cret-suffix");
    }

    #[test]
    fn test_expand_leaves_unresolved() {
        assert_eq!(expand_with("$MISSING and ${MISSING}", lookup), "$MISSING and ${MISSING}");
        assert_eq!(expand_with("cost: $5 or $", lookup), "cost: $5 or $");
        assert_eq!(expand_with("${HOST", lookup), "${HOST");
    }

    #[test]
    fn test_expand_from_process_env() {
        assert_eq!(
            expand_env_vars("name = \"${CARGO_PKG_NAME}\""),
            format!("name = \"{}\"", env!("CARGO_PKG_NAME"))
        );
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = CliConfig::load_from(Path::new("does/not/exist/payintent.toml")).unwrap();
        assert_eq!(config, CliConfig::default());
        assert!(matches!(
            config.users_directory(),
            Err(CliError::MissingSetting("api.users_base_url"))
        ));
        assert!(config.rpc_cache().unwrap().chains().next().is_none());
    }

    #[test]
    fn test_parse_full_document() {
        let config: CliConfig = toml::from_str(
            r#"
            [intent]
            nameServiceSuffixes = [".eth", ".base.eth"]
            defaultSlippagePercentage = "0.3"

            [api]
            users_base_url = "https://api.example.com"
            api_key = "abc"
            timeout_ms = 2500

            [rpc."1"]
            endpoints = ["https://a.example", "https://b.example"]

            [rpc."0x2105"]
            endpoints = ["https://base.example"]
            timeout_ms = 1000
            "#,
        )
        .unwrap();

        assert_eq!(config.intent.name_service_suffixes.len(), 2);
        assert_eq!(config.intent.default_slippage_percentage, Decimal::new(3, 1));
        assert_eq!(config.intent.wallet_token, "usdc");
        assert_eq!(config.api.timeout_ms, Some(2500));

        let directory = config.users_directory().unwrap();
        assert_eq!(
            directory.client().timeout(),
            Some(Duration::from_millis(2500))
        );
        assert!(directory.client().headers().contains_key("api-key"));

        let cache = config.rpc_cache().unwrap();
        let mut chains: Vec<_> = cache.chains().collect();
        chains.sort();
        assert_eq!(chains, vec![ChainId::new(1), ChainId::new(8453)]);
        let base = cache.get_or_create(ChainId::new(8453)).unwrap();
        assert_eq!(base.timeout(), Some(Duration::from_millis(1000)));
        assert_eq!(cache.get_or_create(ChainId::new(1)).unwrap().endpoints().len(), 2);
    }

    #[test]
    fn test_unresolved_api_key_is_skipped() {
        let config = CliConfig {
            api: ApiConfig {
                prices_base_url: Some("https://prices.example".into()),
                api_key: Some("$NOT_SET_ANYWHERE".into()),
                ..ApiConfig::default()
            },
            ..CliConfig::default()
        };
        assert!(config.price_source().is_ok());
        let directory = CliConfig {
            api: ApiConfig {
                users_base_url: Some("https://api.example".into()),
                api_key: Some("$NOT_SET_ANYWHERE".into()),
                ..ApiConfig::default()
            },
            ..CliConfig::default()
        }
        .users_directory()
        .unwrap();
        assert!(directory.client().headers().is_empty());
    }

    #[test]
    fn test_bad_rpc_key_is_reported() {
        let config: CliConfig = toml::from_str(
            r#"
            [rpc.mainnet]
            endpoints = ["https://a.example"]
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.rpc_cache(),
            Err(CliError::InvalidRpcConfig { key, .. }) if key == "mainnet"
        ));
    }
}
