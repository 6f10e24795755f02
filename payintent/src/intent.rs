//! Payment path parsing.
//!
//! Turns the segments of a shared path such as `/vitalik.eth@base/10usdc`
//! into a typed [`PaymentPath`]. No I/O happens here; the recipient is
//! classified but not resolved.

use serde::{Deserialize, Serialize};

use crate::amount::{AmountFormatError, parse_amount_and_token, validate_amount};
use crate::chain::ChainId;
use crate::config::IntentConfig;
use crate::networks::{ChainResolveError, NetworkRegistry};
use crate::recipient::{RecipientClassifier, RecipientKind, has_hex_prefix};

/// A parsed, not yet resolved, payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPath {
    /// Recipient identifier without any chain qualifier.
    pub recipient: String,
    /// How the recipient was classified.
    pub recipient_type: RecipientKind,
    /// Destination chain, if one was given or implied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<ChainId>,
    /// Requested amount as written in the path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    /// Lower-case token symbol.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Token symbol not accepted by the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The symbol is not in [`IntentConfig::supported_tokens`].
    #[error("Token {0:?} is not supported")]
    Unsupported(String),
}

/// Why a payment path could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntentError {
    /// No recipient segment.
    #[error("Payment path has no recipient")]
    MissingRecipient,
    /// A `0x` recipient that is not a valid address.
    #[error("Invalid recipient {0:?}. Please verify the address and try again")]
    InvalidRecipient(String),
    /// Bad amount segment.
    #[error(transparent)]
    Amount(#[from] AmountFormatError),
    /// Unknown chain qualifier.
    #[error(transparent)]
    Chain(#[from] ChainResolveError),
    /// Unsupported token symbol.
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Parses path segments into a [`PaymentPath`].
///
/// The first segment is `recipient[@chain]`, the optional second segment is
/// `[amount][token]`. Further segments are ignored. Usernames always settle
/// in the platform wallet, so their chain and token come from `config`
/// regardless of what the path says.
///
/// # Errors
///
/// See [`IntentError`].
pub fn parse_payment_path<S: AsRef<str>>(
    segments: &[S],
    networks: &NetworkRegistry,
    config: &IntentConfig,
) -> Result<PaymentPath, IntentError> {
    let first = segments
        .first()
        .map(|s| s.as_ref().trim())
        .ok_or(IntentError::MissingRecipient)?;
    let (recipient, qualifier) = match first.split_once('@') {
        Some((recipient, chain)) => (recipient, Some(chain)),
        None => (first, None),
    };
    if recipient.is_empty() {
        return Err(IntentError::MissingRecipient);
    }

    let recipient_type = RecipientClassifier::from_config(config).classify(recipient);
    if recipient_type == RecipientKind::Username && has_hex_prefix(recipient) {
        return Err(IntentError::InvalidRecipient(recipient.to_owned()));
    }

    let parsed = match segments.get(1) {
        Some(segment) => parse_amount_and_token(segment.as_ref())?,
        None => crate::amount::ParsedAmountToken::default(),
    };
    let amount = match parsed.amount {
        Some(amount) => Some(validate_amount(&amount)?.amount),
        None => None,
    };

    if recipient_type == RecipientKind::Username {
        return Ok(PaymentPath {
            recipient: recipient.to_owned(),
            recipient_type,
            chain: Some(config.wallet_chain_id),
            amount,
            token: Some(config.wallet_token.clone()),
        });
    }

    let chain = qualifier
        .filter(|q| !q.is_empty())
        .map(|q| networks.resolve_chain(q))
        .transpose()?;
    let token = match parsed.token {
        Some(token) if !config.is_supported_token(&token) => {
            return Err(TokenError::Unsupported(token).into());
        }
        token => token,
    };

    Ok(PaymentPath {
        recipient: recipient.to_owned(),
        recipient_type,
        chain,
        amount,
        token,
    })
}
