//! HTTP collaborators for payment intent resolution.
//!
//! Implements the [`payintent`] collaborator traits over the platform's
//! REST APIs using `reqwest`.
//!
//! # Modules
//!
//! - [`client`] - Base URL, headers, timeout and response decoding shared by all collaborators
//! - [`directory`] - [`UsernameDirectory`](payintent::resolve::UsernameDirectory) over the users API
//! - [`prices`] - [`PriceSource`](payintent::quote::PriceSource) over the token-price API
//! - [`error`] - HTTP client error types

pub mod client;
pub mod directory;
pub mod error;
pub mod prices;

pub use client::ApiClient;
pub use directory::HttpUsernameDirectory;
pub use error::ApiClientError;
pub use prices::HttpPriceSource;
