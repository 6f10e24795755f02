//! Error types for the command-line front end.

use std::path::PathBuf;

use payintent::error::ResolveError;
use payintent::intent::IntentError;
use payintent::networks::ChainResolveError;
use payintent::quote::QuoteError;
use payintent_evm::RpcError;
use payintent_http::ApiClientError;

/// Errors that can occur while running a `payintent` command.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The config file exists but could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        /// Path that was read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`CliConfig`](crate::config::CliConfig).
    #[error("failed to parse config {}: {source}", path.display())]
    ConfigParse {
        /// Path that was parsed.
        path: PathBuf,
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A setting the command needs is absent from the config.
    #[error("{0} is not configured")]
    MissingSetting(&'static str),

    /// An `[rpc]` table key or endpoint is malformed.
    #[error("invalid [rpc] entry {key:?}: {message}")]
    InvalidRpcConfig {
        /// The `[rpc."<chainId>"]` key.
        key: String,
        /// What was wrong with it.
        message: String,
    },

    /// The configured API key is not a valid header value.
    #[error("api.api_key is not a valid header value")]
    InvalidApiKey,

    /// An API base URL could not be used.
    #[error(transparent)]
    ApiClient(#[from] ApiClientError),

    /// RPC client construction failed.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// A chain identifier did not resolve.
    #[error(transparent)]
    Chain(#[from] ChainResolveError),

    /// The payment path did not parse.
    #[error(transparent)]
    Intent(#[from] IntentError),

    /// Recipient resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The quote could not be computed.
    #[error(transparent)]
    Quote(#[from] QuoteError),

    /// Command output could not be encoded.
    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}
