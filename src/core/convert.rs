//! Currency conversion over a fetched rate table.
use crate::core::rates::RateTable;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Converted amount is out of range")]
    OutOfRange,
}

/// A single conversion asked for by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub from: String,
    pub to: String,
    pub amount: f64,
}

impl ConversionRequest {
    /// Builds a request from raw user input, normalising codes and parsing the amount.
    pub fn parse(from: &str, to: &str, amount: &str) -> Result<Self, ConvertError> {
        Ok(ConversionRequest {
            from: normalize_code(from),
            to: normalize_code(to),
            amount: parse_amount(amount)?,
        })
    }

    pub fn convert(&self, rates: &RateTable) -> Result<f64, ConvertError> {
        convert(rates, &self.from, &self.to, self.amount)
    }
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Parses a user supplied amount. Only finite numbers are accepted.
pub fn parse_amount(text: &str) -> Result<f64, ConvertError> {
    match text.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err(ConvertError::InvalidAmount(text.to_string())),
    }
}

/// Rounds to two decimals, halves away from zero.
///
/// Rounding applies to the binary value scaled by 100, not to the decimal
/// text the user typed, so `1.115` rounds to `1.12` and `1.005` to `1.0`.
/// Values too large to carry fractional cents are returned unchanged.
pub fn round_to_cents(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() || value.abs() >= 2f64.powi(52) / 100.0 {
        return value;
    }
    scaled.round() / 100.0
}

/// Converts `amount` of `from` into `to` using rates relative to the table's base.
///
/// The base currency never needs to be present in the table. Any other code
/// missing from the table is reported as [`ConvertError::UnknownCurrency`].
pub fn convert(rates: &RateTable, from: &str, to: &str, amount: f64) -> Result<f64, ConvertError> {
    if !amount.is_finite() {
        return Err(ConvertError::InvalidAmount(amount.to_string()));
    }

    let rate_of = |code: &str| {
        rates
            .get(code)
            .ok_or_else(|| ConvertError::UnknownCurrency(code.to_string()))
    };

    let base = rates.base();
    let value = if from == base {
        if to == base {
            amount
        } else {
            amount * rate_of(to)?
        }
    } else if to == base {
        amount / rate_of(from)?
    } else {
        amount / rate_of(from)? * rate_of(to)?
    };

    if !value.is_finite() {
        return Err(ConvertError::OutOfRange);
    }

    let result = round_to_cents(value);
    debug!(%from, %to, amount, result, "Converted amount");
    Ok(result)
}
