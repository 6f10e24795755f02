//! Cross-chain source amount quoting.
//!
//! Given the amount a recipient should receive in `to_token`, computes how
//! much `from_token` the sender must provide, inflated by a slippage margin.
//!
//! All arithmetic is fixed-point over [`U256`]: prices and amounts are scaled
//! to `max(from.decimals, to.decimals)` digits, multiplied and divided as
//! integers, and only converted back to a decimal string at the very end.
//! Results are therefore reproducible bit-for-bit.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::chain::ChainId;
use crate::config::{IntentConfig, NATIVE_TOKEN_ADDRESS};
use crate::error::LookupError;

/// Largest decimal count whose power of ten fits in a [`U256`].
const MAX_DECIMALS: u8 = 77;

/// `slippage_percentage` is scaled by this before integer division.
const SLIPPAGE_SCALE: u64 = 1000;

/// Denominator for the scaled slippage numerator: 1000 (scale) x 100 (percent).
const SLIPPAGE_DENOMINATOR: u64 = 100_000;

/// A token on a specific chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRef {
    /// Chain the token lives on.
    pub chain_id: ChainId,
    /// Token contract, or the zero/native sentinel for the native asset.
    pub address: Address,
    /// Token decimals (e.g. 6 for USDC, 18 for ETH).
    pub decimals: u8,
}

/// Parameters of a source amount quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteInput {
    /// Token the sender pays with.
    pub from_token: TokenRef,
    /// Token the recipient receives.
    pub to_token: TokenRef,
    /// Amount of `to_token` to deliver, as a decimal string.
    pub to_amount: String,
    /// Slippage tolerance in percent (`0.5` means 0.5%).
    pub slippage_percentage: Decimal,
}

/// USD unit price lookup.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Returns the USD price of one whole token as a decimal string.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] if the price could not be fetched.
    async fn unit_price_usd(&self, token: Address, chain_id: ChainId)
    -> Result<String, LookupError>;
}

#[async_trait]
impl<T: PriceSource + ?Sized> PriceSource for std::sync::Arc<T> {
    async fn unit_price_usd(
        &self,
        token: Address,
        chain_id: ChainId,
    ) -> Result<String, LookupError> {
        (**self).unit_price_usd(token, chain_id).await
    }
}

/// Why a quote could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuoteError {
    /// Slippage below zero.
    #[error("slippage percentage must not be negative, got {0}")]
    NegativeSlippage(Decimal),
    /// A price lookup failed.
    #[error("price lookup failed: {0}")]
    Price(#[from] LookupError),
    /// An amount or price is not a plain decimal number.
    #[error("invalid decimal value {0:?}")]
    InvalidDecimal(String),
    /// Token decimals too large for fixed-point arithmetic.
    #[error("unsupported token decimals {0}")]
    UnsupportedDecimals(u8),
    /// The source token is priced at zero.
    #[error("source token price is zero")]
    ZeroPrice,
    /// An intermediate value exceeded 256 bits.
    #[error("arithmetic overflow")]
    Overflow,
}

/// Computes source amounts from live USD prices.
#[derive(Debug, Clone)]
pub struct QuoteCalculator<P> {
    prices: P,
    native_token_address: Address,
}

impl<P: PriceSource> QuoteCalculator<P> {
    /// Creates a calculator using [`NATIVE_TOKEN_ADDRESS`] for native assets.
    #[must_use]
    pub const fn new(prices: P) -> Self {
        Self {
            prices,
            native_token_address: NATIVE_TOKEN_ADDRESS,
        }
    }

    /// Creates a calculator configured from an [`IntentConfig`].
    #[must_use]
    pub const fn from_config(prices: P, config: &IntentConfig) -> Self {
        Self {
            prices,
            native_token_address: config.native_token_address,
        }
    }

    /// Returns the price source.
    #[must_use]
    pub const fn prices(&self) -> &P {
        &self.prices
    }

    /// Computes the source amount for `input`, including slippage, in
    /// `from_token` precision.
    ///
    /// Returns `None` on any failure so callers can degrade gracefully; use
    /// [`try_compute_source_amount`](Self::try_compute_source_amount) for the reason.
    pub async fn compute_source_amount(&self, input: &QuoteInput) -> Option<String> {
        match self.try_compute_source_amount(input).await {
            Ok(amount) => Some(amount),
            Err(error) => {
                #[cfg(feature = "telemetry")]
                tracing::warn!(%error, "quote unavailable");
                #[cfg(not(feature = "telemetry"))]
                let _ = error;
                None
            }
        }
    }

    /// Computes the source amount for `input`, reporting why it failed.
    ///
    /// Both prices are fetched concurrently; if either lookup fails the quote fails.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError`] for negative slippage, failed price lookups,
    /// malformed numbers or arithmetic overflow.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "payintent.quote", skip_all, err, fields(
            from_chain = %input.from_token.chain_id,
            to_chain = %input.to_token.chain_id,
            to_amount = %input.to_amount,
        ))
    )]
    pub async fn try_compute_source_amount(&self, input: &QuoteInput) -> Result<String, QuoteError> {
        if input.slippage_percentage.is_sign_negative() && !input.slippage_percentage.is_zero() {
            return Err(QuoteError::NegativeSlippage(input.slippage_percentage));
        }

        let from_address = self.normalize_native(input.from_token.address);
        let to_address = self.normalize_native(input.to_token.address);

        let (from_price, to_price) = futures_util::future::try_join(
            self.prices
                .unit_price_usd(from_address, input.from_token.chain_id),
            self.prices
                .unit_price_usd(to_address, input.to_token.chain_id),
        )
        .await?;

        source_amount_from_prices(
            &input.to_amount,
            &to_price,
            &from_price,
            input.to_token.decimals,
            input.from_token.decimals,
            input.slippage_percentage,
        )
    }

    fn normalize_native(&self, address: Address) -> Address {
        if address == Address::ZERO {
            self.native_token_address
        } else {
            address
        }
    }
}

/// Computes `to_amount * to_price / from_price` plus slippage, in
/// `from_decimals` precision, without touching floating point.
///
/// # Errors
///
/// Returns [`QuoteError`] for negative slippage, malformed inputs, a zero
/// source price or overflow.
pub fn source_amount_from_prices(
    to_amount: &str,
    to_price: &str,
    from_price: &str,
    to_decimals: u8,
    from_decimals: u8,
    slippage_percentage: Decimal,
) -> Result<String, QuoteError> {
    if slippage_percentage.is_sign_negative() && !slippage_percentage.is_zero() {
        return Err(QuoteError::NegativeSlippage(slippage_percentage));
    }
    let normalized = from_decimals.max(to_decimals);

    let to_amount = parse_units(to_amount, normalized)?;
    let to_price = parse_units(to_price, normalized)?;
    let from_price = parse_units(from_price, normalized)?;
    if from_price.is_zero() {
        return Err(QuoteError::ZeroPrice);
    }

    let from_amount = to_amount
        .checked_mul(to_price)
        .ok_or(QuoteError::Overflow)?
        / from_price;

    let slippage_numerator = (slippage_percentage * Decimal::from(SLIPPAGE_SCALE))
        .trunc()
        .to_u128()
        .ok_or(QuoteError::Overflow)?;
    let slippage_amount = from_amount
        .checked_mul(U256::from(slippage_numerator))
        .ok_or(QuoteError::Overflow)?
        / U256::from(SLIPPAGE_DENOMINATOR);

    let total = from_amount
        .checked_add(slippage_amount)
        .ok_or(QuoteError::Overflow)?;
    let in_from_precision = total / pow10(normalized - from_decimals)?;
    Ok(format_units(in_from_precision, from_decimals))
}

fn pow10(exponent: u8) -> Result<U256, QuoteError> {
    if exponent > MAX_DECIMALS {
        return Err(QuoteError::UnsupportedDecimals(exponent));
    }
    Ok(U256::from(10u8).pow(U256::from(exponent)))
}

/// Decimal digits in `U256::MAX`.
const MAX_U256_DIGITS: i64 = 78;

/// Parses a decimal string into a fixed-point integer with `decimals` digits.
///
/// Accepts plain decimals (`"12.5"`, `".5"`, `"3."`) and scientific notation
/// (`"1.5e-7"`), as emitted by JSON price APIs. Digits beyond `decimals`
/// are truncated.
///
/// # Errors
///
/// Returns [`QuoteError::InvalidDecimal`] for anything else (including signs),
/// and [`QuoteError::Overflow`] if the value does not fit in 256 bits.
pub fn parse_units(value: &str, decimals: u8) -> Result<U256, QuoteError> {
    let invalid = || QuoteError::InvalidDecimal(value.to_owned());
    let trimmed = value.trim();

    let (mantissa, exponent) = match trimmed.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().map_err(|_| invalid())?),
        None => (trimmed, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part)
    {
        return Err(invalid());
    }

    // Shift the decimal point right by `decimals + exponent` places.
    let shift = i64::from(decimals) + i64::from(exponent);
    let digits = format!("{int_part}{frac_part}");
    if digits.bytes().all(|b| b == b'0') {
        return Ok(U256::ZERO);
    }
    let point = i64::try_from(int_part.len()).map_err(|_| invalid())? + shift;

    // A nonzero digit followed by more than 78 zeros exceeds 2^256.
    let digit_count = i64::try_from(digits.len()).map_err(|_| invalid())?;
    if point - digit_count > MAX_U256_DIGITS {
        return Err(QuoteError::Overflow);
    }

    let scaled: String = if point <= 0 {
        String::new()
    } else {
        let point = usize::try_from(point).map_err(|_| invalid())?;
        if point <= digits.len() {
            digits[..point].to_owned()
        } else {
            let mut padded = digits;
            padded.extend(std::iter::repeat_n('0', point - padded.len()));
            padded
        }
    };

    if scaled.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(&scaled, 10).map_err(|_| QuoteError::Overflow)
}

/// Formats a fixed-point integer with `decimals` digits as a decimal string.
///
/// Trailing fractional zeros are dropped, and so is the point when nothing
/// remains after it: `1500000` with 6 decimals is `"1.5"`, `2000000` is `"2"`.
#[must_use]
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = usize::from(decimals);
    if decimals == 0 {
        return digits;
    }
    let padded = if digits.len() <= decimals {
        format!("{}{digits}", "0".repeat(decimals + 1 - digits.len()))
    } else {
        digits
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part.to_owned()
    } else {
        format!("{int_part}.{frac_part}")
    }
}
