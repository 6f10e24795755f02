//! Command-line interface definitions.

use std::path::PathBuf;

use alloy_primitives::Address;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use crate::config::DEFAULT_CONFIG_PATH;

/// Parse, route, resolve and quote payment intents.
#[derive(Parser, Debug)]
#[command(name = "payintent")]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, env = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands. Each prints its result as JSON.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decide which flow a payment URL opens
    Route {
        /// Path segments after the domain, already percent-decoded
        segments: Vec<String>,

        /// Query parameter, repeatable
        #[arg(short, long = "query", value_name = "KEY=VALUE", value_parser = parse_query_pair)]
        query: Vec<(String, String)>,
    },

    /// Parse a payment path into recipient, chain, amount and token
    Parse {
        /// Path segments, e.g. `vitalik.eth@base 10usdc`
        segments: Vec<String>,
    },

    /// Resolve a recipient identifier to an address
    Resolve {
        /// Address, name-service name or platform username
        identifier: String,

        /// Treat every non-address as a name-service name
        #[arg(long)]
        withdrawal: bool,
    },

    /// Check whether a platform username exists
    CheckUsername {
        /// Username to look up
        username: String,
    },

    /// Compute how much of one token buys an amount of another
    Quote(QuoteArgs),
}

/// Arguments of `payintent quote`.
#[derive(Args, Debug, Clone)]
pub struct QuoteArgs {
    /// Source chain: name, decimal id or hex id
    #[arg(long)]
    pub from_chain: String,

    /// Source token address; the zero address means the native asset
    #[arg(long)]
    pub from_token: Address,

    /// Source token decimals
    #[arg(long)]
    pub from_decimals: u8,

    /// Destination chain: name, decimal id or hex id
    #[arg(long)]
    pub to_chain: String,

    /// Destination token address
    #[arg(long)]
    pub to_token: Address,

    /// Destination token decimals
    #[arg(long)]
    pub to_decimals: u8,

    /// Destination amount in whole units, e.g. `10.5`
    #[arg(long)]
    pub amount: String,

    /// Slippage in percent; defaults to `intent.defaultSlippagePercentage`
    #[arg(long, allow_hyphen_values = true)]
    pub slippage: Option<Decimal>,
}

fn parse_query_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))
}
