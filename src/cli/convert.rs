use super::ui;
use crate::core::convert::{ConversionRequest, ConvertError};
use crate::core::rates::RateSource;
use anyhow::Result;
use tracing::debug;

/// What the user sees after asking for a conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    Converted {
        request: ConversionRequest,
        value: f64,
    },
    InvalidInput,
    RatesUnavailable,
    UnknownCurrency(String),
    OutOfRange,
}

impl ConversionOutcome {
    /// Text for the result label.
    pub fn label(&self) -> String {
        match self {
            ConversionOutcome::Converted { value, .. } => format!("{value:.2}"),
            ConversionOutcome::InvalidInput => "Invalid input".to_string(),
            ConversionOutcome::RatesUnavailable => "Rates unavailable".to_string(),
            ConversionOutcome::UnknownCurrency(code) => format!("Unknown currency: {code}"),
            ConversionOutcome::OutOfRange => "Result out of range".to_string(),
        }
    }

    pub fn display(&self) -> String {
        match self {
            ConversionOutcome::Converted { request, .. } => format!(
                "{:.2} {} = {} {}",
                request.amount,
                request.from,
                ui::style_text(&self.label(), ui::StyleType::ResultValue),
                request.to
            ),
            _ => ui::style_text(&self.label(), ui::StyleType::Error),
        }
    }
}

/// Parses the amount, fetches fresh rates and converts.
///
/// Rates are only fetched once the amount is known to be valid, and every
/// failure maps to an outcome instead of an error.
pub async fn perform_conversion(
    source: &dyn RateSource,
    from: &str,
    to: &str,
    amount_text: &str,
) -> ConversionOutcome {
    let request = match ConversionRequest::parse(from, to, amount_text) {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "Rejected conversion input");
            return ConversionOutcome::InvalidInput;
        }
    };

    let rates = source.fetch().await;
    if rates.is_empty() {
        return ConversionOutcome::RatesUnavailable;
    }

    match request.convert(&rates) {
        Ok(value) => ConversionOutcome::Converted { request, value },
        Err(ConvertError::UnknownCurrency(code)) => ConversionOutcome::UnknownCurrency(code),
        Err(ConvertError::InvalidAmount(_)) => ConversionOutcome::InvalidInput,
        Err(ConvertError::OutOfRange) => ConversionOutcome::OutOfRange,
    }
}

pub async fn run(
    source: &dyn RateSource,
    from: &str,
    to: &str,
    amount_text: &str,
) -> Result<ConversionOutcome> {
    let pb = ui::new_spinner("Fetching exchange rates");
    let outcome = perform_conversion(source, from, to, amount_text).await;
    pb.finish_and_clear();

    println!("{}", outcome.display());
    Ok(outcome)
}
