//! `payintent` command-line tool.
//!
//! # Usage
//!
//! ```bash
//! # Decide which flow a payment URL opens
//! payintent route alice 10usdc --query chargeId=ch_1
//!
//! # Parse and resolve recipients
//! payintent parse vitalik.eth@base 10usdc
//! payintent resolve vitalik.eth
//! payintent check-username alice
//!
//! # Quote 100 USDC on Arbitrum paid in mainnet ETH
//! payintent quote --from-chain eth --from-token 0x0000000000000000000000000000000000000000 \
//!     --from-decimals 18 --to-chain arbitrum \
//!     --to-token 0xaf88d065e77c8cC2239327C5EDb3A432268e5831 --to-decimals 6 --amount 100
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to TOML configuration file (default: `payintent.toml`)
//! - `RUST_LOG` - Log level filter (default: `info`)
//!
//! A `.env` file in the working directory is loaded first.

use std::io::Write;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use payintent_cli::commands::execute;
use payintent_cli::{Cli, CliConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout carries only the JSON result
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!("payintent failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::load_from(&cli.config)?;
    tracing::debug!(
        config = %cli.config.display(),
        rpc_chains = config.rpc.len(),
        "Loaded configuration"
    );

    let output = execute(cli.command, &config).await?;

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &output)?;
    writeln!(stdout)?;
    Ok(())
}
