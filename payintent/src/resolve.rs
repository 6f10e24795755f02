//! Recipient resolution.
//!
//! Turns a recipient identifier into a canonical on-chain address. The
//! identifier is classified first, then exactly one collaborator is asked:
//!
//! - [`RecipientKind::Address`]: no external call, the address is re-validated.
//! - [`RecipientKind::EnsName`]: one [`NameResolver::resolve_name`] call.
//! - [`RecipientKind::Username`]: one [`UsernameDirectory::user_accounts`] call.
//!
//! Collaborator answers are decoded into [`Lookup`] at the boundary, so the
//! resolver never inspects raw responses. Nothing is cached here; callers that
//! want memoization wrap the resolver.

use alloy_primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::config::{DEFAULT_WALLET_ACCOUNT_TYPE, IntentConfig};
use crate::error::{LookupError, ResolveError};
use crate::recipient::{
    RecipientClassifier, RecipientKind, has_hex_prefix, lowercase_hex, parse_address,
};

/// Outcome of a collaborator lookup that reached the collaborator.
///
/// Transport failures are reported separately as [`LookupError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The record exists.
    Found(T),
    /// The collaborator answered that there is no such record.
    NotFound,
}

impl<T> Lookup<T> {
    /// Converts into an `Option`, dropping the distinction from transport errors.
    #[must_use]
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::NotFound, Self::Found)
    }
}

/// Off-chain name resolution (ENS and compatible services).
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Resolves a name to the address it points at.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the service could not be reached or
    /// answered garbage. A name without an address record is
    /// `Ok(Lookup::NotFound)`.
    async fn resolve_name(&self, name: &str) -> Result<Lookup<Address>, LookupError>;
}

/// An account registered for a platform user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Account type, e.g. `"peanut-wallet"` or `"iban"`.
    #[serde(rename = "type")]
    pub account_type: String,
    /// Account identifier; an address for wallet accounts.
    pub identifier: String,
}

/// The accounts registered for a platform user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccounts {
    /// Registered accounts, in directory order.
    #[serde(default)]
    pub accounts: Vec<UserAccount>,
}

/// Platform username directory.
#[async_trait]
pub trait UsernameDirectory: Send + Sync {
    /// Fetches the accounts of the user with exactly this (case-sensitive) username.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] on transport failure. An unknown user is
    /// `Ok(Lookup::NotFound)`.
    async fn user_accounts(&self, username: &str) -> Result<Lookup<UserAccounts>, LookupError>;

    /// Cheap existence check that does not fetch the full profile.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] on transport failure.
    async fn exists(&self, username: &str) -> Result<bool, LookupError>;
}

/// A recipient identifier together with the address it resolved to.
///
/// Only constructed by [`RecipientResolver`] after a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRecipient {
    /// The identifier as the user supplied it.
    pub identifier: String,
    /// How the identifier was classified.
    pub recipient_type: RecipientKind,
    /// Destination address.
    #[serde(serialize_with = "serialize_lowercase")]
    pub resolved_address: Address,
}

impl ResolvedRecipient {
    /// Returns the destination address as lower-case hex.
    #[must_use]
    pub fn resolved_address_hex(&self) -> String {
        lowercase_hex(&self.resolved_address)
    }
}

fn serialize_lowercase<S>(address: &Address, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&lowercase_hex(address))
}

/// Resolves recipient identifiers through a name resolver and a username directory.
#[derive(Debug, Clone)]
pub struct RecipientResolver<N, D> {
    names: N,
    directory: D,
    classifier: RecipientClassifier,
    eligible_account_types: Vec<String>,
}

impl<N, D> RecipientResolver<N, D>
where
    N: NameResolver,
    D: UsernameDirectory,
{
    /// Creates a resolver with the default classifier and account types.
    #[must_use]
    pub fn new(names: N, directory: D) -> Self {
        Self {
            names,
            directory,
            classifier: RecipientClassifier::default(),
            eligible_account_types: vec![DEFAULT_WALLET_ACCOUNT_TYPE.to_owned()],
        }
    }

    /// Creates a resolver configured from an [`IntentConfig`].
    #[must_use]
    pub fn from_config(names: N, directory: D, config: &IntentConfig) -> Self {
        Self {
            names,
            directory,
            classifier: RecipientClassifier::from_config(config),
            eligible_account_types: config.eligible_account_types.clone(),
        }
    }

    /// Replaces the classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: RecipientClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Returns the classifier used for dispatch.
    #[must_use]
    pub const fn classifier(&self) -> &RecipientClassifier {
        &self.classifier
    }

    /// Resolves an identifier to a destination address.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::InvalidAddress`] if an address-shaped or `0x`-prefixed
    ///   identifier does not parse
    /// - [`ResolveError::NameNotFound`] if the name has no address record
    /// - [`ResolveError::UnknownUsername`] / [`ResolveError::NoPaymentAccount`] /
    ///   [`ResolveError::InvalidPaymentAccount`] for usernames
    /// - [`ResolveError::Transient`] if a collaborator could not be reached
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "payintent.resolve", skip(self), err)
    )]
    pub async fn resolve(&self, identifier: &str) -> Result<ResolvedRecipient, ResolveError> {
        let kind = self.classifier.classify(identifier);
        self.resolve_as(identifier, kind).await
    }

    /// Resolves an identifier for an external withdrawal, where every
    /// non-address is treated as a name-service name.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve), minus the username variants.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "payintent.resolve_for_withdrawal", skip(self), err)
    )]
    pub async fn resolve_for_withdrawal(
        &self,
        identifier: &str,
    ) -> Result<ResolvedRecipient, ResolveError> {
        let kind = self.classifier.classify_for_withdrawal(identifier);
        self.resolve_as(identifier, kind).await
    }

    async fn resolve_as(
        &self,
        identifier: &str,
        kind: RecipientKind,
    ) -> Result<ResolvedRecipient, ResolveError> {
        #[cfg(feature = "telemetry")]
        tracing::debug!(%kind, "classified recipient");

        let resolved_address = match kind {
            RecipientKind::Address => {
                parse_address(identifier).ok_or_else(|| ResolveError::InvalidAddress {
                    identifier: identifier.to_owned(),
                })?
            }
            RecipientKind::EnsName => self.resolve_name(identifier).await?,
            // A 0x-prefixed non-address is a mistyped address, never a username.
            RecipientKind::Username if has_hex_prefix(identifier) => {
                return Err(ResolveError::InvalidAddress {
                    identifier: identifier.to_owned(),
                });
            }
            RecipientKind::Username => self.resolve_username(identifier).await?,
        };

        Ok(ResolvedRecipient {
            identifier: identifier.to_owned(),
            recipient_type: kind,
            resolved_address,
        })
    }

    async fn resolve_name(&self, name: &str) -> Result<Address, ResolveError> {
        match self.names.resolve_name(name).await {
            Ok(Lookup::Found(address)) => Ok(address),
            Ok(Lookup::NotFound) => Err(ResolveError::NameNotFound {
                name: name.to_owned(),
            }),
            Err(source) => Err(ResolveError::Transient {
                identifier: name.to_owned(),
                source,
            }),
        }
    }

    async fn resolve_username(&self, username: &str) -> Result<Address, ResolveError> {
        let accounts = match self.directory.user_accounts(username).await {
            Ok(Lookup::Found(accounts)) => accounts,
            Ok(Lookup::NotFound) => {
                return Err(ResolveError::UnknownUsername {
                    username: username.to_owned(),
                });
            }
            Err(source) => {
                return Err(ResolveError::Transient {
                    identifier: username.to_owned(),
                    source,
                });
            }
        };

        let account = self
            .eligible_account_types
            .iter()
            .find_map(|wanted| {
                accounts
                    .accounts
                    .iter()
                    .find(|account| account.account_type == *wanted)
            })
            .ok_or_else(|| ResolveError::NoPaymentAccount {
                username: username.to_owned(),
            })?;

        parse_address(&account.identifier).ok_or_else(|| ResolveError::InvalidPaymentAccount {
            username: username.to_owned(),
            account: account.identifier.clone(),
        })
    }

    /// Checks whether a username exists, for UI gating.
    ///
    /// Never fails: a transport error is reported as `false`.
    pub async fn verify_username_exists(&self, username: &str) -> bool {
        verify_username_exists(&self.directory, username).await
    }
}

/// Checks whether a username exists, for UI gating.
///
/// Never fails: a transport error is reported as `false`.
pub async fn verify_username_exists<D>(directory: &D, username: &str) -> bool
where
    D: UsernameDirectory + ?Sized,
{
    match directory.exists(username).await {
        Ok(exists) => exists,
        Err(error) => {
            #[cfg(feature = "telemetry")]
            tracing::debug!(username, %error, "username check failed, reporting absent");
            #[cfg(not(feature = "telemetry"))]
            let _ = error;
            false
        }
    }
}

#[async_trait]
impl<T: NameResolver + ?Sized> NameResolver for std::sync::Arc<T> {
    async fn resolve_name(&self, name: &str) -> Result<Lookup<Address>, LookupError> {
        (**self).resolve_name(name).await
    }
}

#[async_trait]
impl<T: UsernameDirectory + ?Sized> UsernameDirectory for std::sync::Arc<T> {
    async fn user_accounts(&self, username: &str) -> Result<Lookup<UserAccounts>, LookupError> {
        (**self).user_accounts(username).await
    }

    async fn exists(&self, username: &str) -> Result<bool, LookupError> {
        (**self).exists(username).await
    }
}
