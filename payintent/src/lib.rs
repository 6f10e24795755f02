#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Payment intent resolution.
//!
//! Turns a shared payment path (a recipient identifier, an optional amount
//! and token, an optional `@chain` qualifier) into a validated, resolved
//! intent, and decides which application flow should handle it.
//!
//! This crate is chain- and transport-agnostic. External collaborators (a
//! name service, the platform username directory, a USD price feed) are
//! expressed as traits in [`resolve`] and [`quote`]; concrete EVM and HTTP
//! implementations live in separate crates.
//!
//! # Modules
//!
//! - [`amount`] - Amount/token grammar and amount validation
//! - [`chain`] - EIP-155 chain identifiers
//! - [`config`] - Explicit configuration shared by all components
//! - [`error`] - Shared error types
//! - [`intent`] - Full payment-path parsing
//! - [`networks`] - Registry of network name variants
//! - [`quote`] - Fixed-point cross-chain source amount quoting
//! - [`recipient`] - Structural recipient classification
//! - [`resolve`] - Asynchronous recipient resolution
//! - [`route`] - Flow routing decision table
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod amount;
pub mod chain;
pub mod config;
pub mod error;
pub mod intent;
pub mod networks;
pub mod quote;
pub mod recipient;
pub mod resolve;
pub mod route;

pub use error::{Error, LookupError, ResolveError};
