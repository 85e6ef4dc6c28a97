//! Exchange rate abstractions and core types

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

/// Currency every fetched rate is expressed against.
pub const BASE_CURRENCY: &str = "EUR";

/// Rates keyed by currency code, each giving units of that currency per one
/// unit of the base currency.
///
/// A table is built once per fetch and never mutated afterwards. Only positive
/// finite rates are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    base: String,
    date: Option<NaiveDate>,
    rates: HashMap<String, f64>,
}

impl RateTable {
    pub fn new(rates: HashMap<String, f64>) -> Self {
        Self::with_details(BASE_CURRENCY, None, rates)
    }

    pub fn with_details(base: &str, date: Option<NaiveDate>, rates: HashMap<String, f64>) -> Self {
        let rates = rates
            .into_iter()
            .filter(|(code, rate)| {
                let valid = rate.is_finite() && *rate > 0.0;
                if !valid {
                    warn!(code = %code, rate = %rate, "Dropping invalid rate");
                }
                valid
            })
            .collect();

        RateTable {
            base: base.to_string(),
            date,
            rates,
        }
    }

    /// An empty table means no data is available, not that no currencies exist.
    pub fn empty() -> Self {
        RateTable {
            base: BASE_CURRENCY.to_string(),
            date: None,
            rates: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        code == self.base || self.rates.contains_key(code)
    }

    /// Sorted currency codes available for selection, base included.
    pub fn codes(&self) -> Vec<String> {
        if self.is_empty() {
            return Vec::new();
        }
        let mut codes: Vec<String> = self.rates.keys().cloned().collect();
        if !self.rates.contains_key(&self.base) {
            codes.push(self.base.clone());
        }
        codes.sort();
        codes
    }
}

/// Failures while retrieving rates from a provider.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request error: {0}")]
    Request(reqwest::Error),

    #[error("Invalid provider URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),

    #[error("Failed to parse rates response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("'rates' not found in response{}", .info.as_deref().map(|i| format!(": {i}")).unwrap_or_default())]
    MissingRates { info: Option<String> },
}

// Request URLs carry the API key, so they are stripped before the error is kept
impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Request(err.without_url())
    }
}

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Performs one request for the latest rates.
    async fn fetch_rates(&self) -> Result<RateTable, FetchError>;

    /// Fetches the latest rates, degrading any failure to an empty table.
    async fn fetch(&self) -> RateTable {
        match self.fetch_rates().await {
            Ok(table) => table,
            Err(e) => {
                warn!(error = %e, "Failed to fetch exchange rates");
                RateTable::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSource;

    #[async_trait]
    impl RateSource for FailingSource {
        async fn fetch_rates(&self) -> Result<RateTable, FetchError> {
            Err(FetchError::MissingRates { info: None })
        }
    }

    #[test]
    fn test_invalid_rates_are_dropped() {
        let table = RateTable::new(HashMap::from([
            ("USD".to_string(), 1.1),
            ("XXX".to_string(), 0.0),
            ("YYY".to_string(), -2.0),
            ("ZZZ".to_string(), f64::NAN),
        ]));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("USD"), Some(1.1));
        assert!(table.get("XXX").is_none());
    }

    #[test]
    fn test_codes_are_sorted_and_include_base() {
        let table = RateTable::new(HashMap::from([
            ("USD".to_string(), 1.1),
            ("GBP".to_string(), 0.85),
        ]));
        assert_eq!(table.codes(), vec!["EUR", "GBP", "USD"]);
        assert!(table.contains("EUR"));
        assert!(!table.contains("JPY"));
    }

    #[test]
    fn test_empty_table_has_no_codes() {
        let table = RateTable::empty();
        assert!(table.is_empty());
        assert!(table.codes().is_empty());
        assert_eq!(table.base(), BASE_CURRENCY);
    }

    #[test]
    fn test_missing_rates_message() {
        let err = FetchError::MissingRates {
            info: Some("invalid_access_key".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "'rates' not found in response: invalid_access_key"
        );
        let err = FetchError::MissingRates { info: None };
        assert_eq!(err.to_string(), "'rates' not found in response");
    }

    #[tokio::test]
    async fn test_fetch_degrades_to_empty_table() {
        let table = FailingSource.fetch().await;
        assert!(table.is_empty());
    }
}
