//! Amount and token grammar for payment paths.
//!
//! A payment path may carry a combined amount/token segment such as `10usdc`,
//! `0.5ETH` or `.25dai`. This module splits such a segment into its numeric and
//! symbolic parts and validates bare amount strings typed by a user.
//!
//! The grammar, applied after trimming and lower-casing, is
//!
//! ```text
//! segment := number? symbol?
//! number  := digits | digits "." digits? | "." digits
//! symbol  := [a-z]+
//! ```
//!
//! The amount text is never re-formatted: `"007."` stays `"007."`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static AMOUNT_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+\.?[0-9]*|\.[0-9]+)?([a-z]+)?$").expect("valid amount/token pattern")
});

static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+\.?[0-9]*|\.[0-9]+)$").expect("valid amount pattern"));

/// Why an amount string was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountFormatReason {
    /// The text does not match the amount grammar.
    Malformed,
    /// The amount parsed but is zero.
    NotPositive,
}

impl fmt::Display for AmountFormatReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => f.write_str("invalid amount format"),
            Self::NotPositive => f.write_str("amount must be greater than zero"),
        }
    }
}

/// A malformed or non-positive amount string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}: {input:?}")]
pub struct AmountFormatError {
    /// The rejected input, as received.
    pub input: String,
    /// Rejection reason.
    pub reason: AmountFormatReason,
}

impl AmountFormatError {
    fn malformed(input: &str) -> Self {
        Self {
            input: input.to_owned(),
            reason: AmountFormatReason::Malformed,
        }
    }

    fn not_positive(input: &str) -> Self {
        Self {
            input: input.to_owned(),
            reason: AmountFormatReason::NotPositive,
        }
    }
}

/// The result of splitting a combined amount/token segment.
///
/// Either part, both, or neither may be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAmountToken {
    /// Decimal amount exactly as written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    /// Lower-case token symbol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl ParsedAmountToken {
    /// Returns `true` when neither an amount nor a token was present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.amount.is_none() && self.token.is_none()
    }
}

/// A validated user-entered amount.
///
/// An empty `amount` means "no amount yet", which is distinct from an invalid amount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedAmount {
    /// The trimmed amount text.
    pub amount: String,
}

/// Splits a combined amount/token segment such as `"0.1usdc"` or `"100ETH"`.
///
/// Empty or whitespace-only input yields an empty [`ParsedAmountToken`].
///
/// # Errors
///
/// Returns [`AmountFormatError`] when the trimmed, lower-cased input does not
/// match the grammar, e.g. `"1.2.3usdc"`, `"abc123"` or `"1.eth2"`.
pub fn parse_amount_and_token(input: &str) -> Result<ParsedAmountToken, AmountFormatError> {
    let normalized = input.trim().to_lowercase();
    if normalized.is_empty() {
        return Ok(ParsedAmountToken::default());
    }
    let captures = AMOUNT_TOKEN_RE
        .captures(&normalized)
        .ok_or_else(|| AmountFormatError::malformed(input))?;
    Ok(ParsedAmountToken {
        amount: captures.get(1).map(|m| m.as_str().to_owned()),
        token: captures.get(2).map(|m| m.as_str().to_owned()),
    })
}

/// Validates a bare, user-entered amount.
///
/// # Errors
///
/// Returns [`AmountFormatError`] with [`AmountFormatReason::Malformed`] for
/// anything that is not a plain non-negative decimal (signs, exponents,
/// thousands separators, several decimal points), and with
/// [`AmountFormatReason::NotPositive`] when the value is zero.
pub fn validate_amount(input: &str) -> Result<ValidatedAmount, AmountFormatError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(ValidatedAmount::default());
    }
    if !AMOUNT_RE.is_match(trimmed) {
        return Err(AmountFormatError::malformed(input));
    }
    if !has_nonzero_digit(trimmed) {
        return Err(AmountFormatError::not_positive(input));
    }
    Ok(ValidatedAmount {
        amount: trimmed.to_owned(),
    })
}

fn has_nonzero_digit(amount: &str) -> bool {
    amount.bytes().any(|b| matches!(b, b'1'..=b'9'))
}
