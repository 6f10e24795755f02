//! Command-line front end for payment intents.
//!
//! # Modules
//!
//! - [`cli`] - Clap argument definitions
//! - [`commands`] - Command execution against the configured collaborators
//! - [`config`] - TOML configuration with environment variable expansion
//! - [`error`] - CLI error types

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::{Cli, Command};
pub use config::CliConfig;
pub use error::CliError;
