//! Error types for payment intent resolution.
//!
//! Grammar and chain errors live next to the code that raises them
//! ([`AmountFormatError`], [`ChainIdFormatError`], [`ChainResolveError`]).
//! This module holds the errors shared across components and the
//! crate-level [`Error`] aggregate.

use crate::amount::AmountFormatError;
use crate::chain::ChainIdFormatError;
use crate::intent::IntentError;
use crate::networks::ChainResolveError;
use crate::quote::QuoteError;

/// Base error type for payment intent operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or non-positive amount.
    #[error(transparent)]
    Amount(#[from] AmountFormatError),

    /// Recipient resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Payment path could not be parsed.
    #[error(transparent)]
    Intent(#[from] IntentError),

    /// Chain id text is malformed.
    #[error(transparent)]
    ChainIdFormat(#[from] ChainIdFormatError),

    /// Chain qualifier names no supported network.
    #[error(transparent)]
    ChainResolve(#[from] ChainResolveError),

    /// Source amount could not be quoted.
    #[error(transparent)]
    Quote(#[from] QuoteError),

    /// An external collaborator failed.
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// A failure talking to an external collaborator (name service, user
/// directory, price API).
///
/// Only transport-level problems land here. "No such record" is reported
/// through [`Lookup::NotFound`](crate::resolve::Lookup::NotFound) instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The request did not complete in time.
    #[error("{service} request timed out")]
    Timeout {
        /// Collaborator that timed out.
        service: &'static str,
    },
    /// Connection, DNS or unexpected-status failure.
    #[error("{service} transport error: {message}")]
    Transport {
        /// Collaborator that failed.
        service: &'static str,
        /// Human-readable detail.
        message: String,
    },
    /// The collaborator answered with something that could not be decoded.
    #[error("{service} returned an invalid response: {message}")]
    InvalidResponse {
        /// Collaborator that answered.
        service: &'static str,
        /// Human-readable detail.
        message: String,
    },
}

impl LookupError {
    /// Creates a [`LookupError::Transport`].
    #[must_use]
    pub fn transport(service: &'static str, message: impl Into<String>) -> Self {
        Self::Transport {
            service,
            message: message.into(),
        }
    }

    /// Creates a [`LookupError::InvalidResponse`].
    #[must_use]
    pub fn invalid_response(service: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            service,
            message: message.into(),
        }
    }
}

/// Why a recipient identifier could not be turned into an address.
///
/// Every variant except [`ResolveError::Transient`] is terminal: retrying
/// the same identifier will fail the same way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Structurally invalid hex address.
    #[error("Invalid address {identifier:?}. Please verify the address and try again")]
    InvalidAddress {
        /// The offending identifier.
        identifier: String,
    },

    /// The name service has no address record for this name.
    #[error("ENS name {name:?} not found. Please verify the name and try again")]
    NameNotFound {
        /// The unresolved name.
        name: String,
    },

    /// A collaborator failed; the identifier may well exist.
    #[error("Could not resolve {identifier:?} right now, please retry: {source}")]
    Transient {
        /// The identifier being resolved.
        identifier: String,
        /// Underlying transport failure.
        #[source]
        source: LookupError,
    },

    /// No platform user has this username.
    #[error("Username {username:?} not found. Please verify the username and try again")]
    UnknownUsername {
        /// The unknown username.
        username: String,
    },

    /// The user exists but has no account that can receive payments.
    #[error(
        "User {username:?} has no account that can receive payments. Please verify the username and try again"
    )]
    NoPaymentAccount {
        /// The username without a payable account.
        username: String,
    },

    /// The user's payment account does not hold a valid address.
    #[error(
        "User {username:?} has an invalid payment account {account:?}. Please verify the username and try again"
    )]
    InvalidPaymentAccount {
        /// The username whose account is malformed.
        username: String,
        /// The account identifier as returned by the directory.
        account: String,
    },
}

impl ResolveError {
    /// Returns `true` if retrying the same resolution may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// Returns the identifier that failed to resolve.
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::InvalidAddress { identifier } | Self::Transient { identifier, .. } => identifier,
            Self::NameNotFound { name } => name,
            Self::UnknownUsername { username }
            | Self::NoPaymentAccount { username }
            | Self::InvalidPaymentAccount { username, .. } => username,
        }
    }
}
