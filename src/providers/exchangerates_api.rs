use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::rates::{BASE_CURRENCY, FetchError, RateSource, RateTable};

// ExchangeRatesApiProvider implementation for RateSource
pub struct ExchangeRatesApiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl ExchangeRatesApiProvider {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fxconv/0.1")
            .timeout(timeout)
            .build()?;
        Ok(ExchangeRatesApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    base: Option<String>,
    date: Option<String>,
    rates: Option<HashMap<String, f64>>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type")]
    kind: Option<String>,
    info: Option<String>,
}

impl ApiErrorBody {
    fn describe(&self) -> Option<String> {
        self.info.clone().or_else(|| self.kind.clone())
    }
}

#[async_trait]
impl RateSource for ExchangeRatesApiProvider {
    #[instrument(name = "ExchangeRatesFetch", skip(self), fields(base_url = %self.base_url))]
    async fn fetch_rates(&self) -> Result<RateTable, FetchError> {
        // The key goes in the query string only, never in logs
        let endpoint = format!("{}/latest", self.base_url);
        debug!("Requesting latest rates from {}", endpoint);

        let url = reqwest::Url::parse_with_params(&endpoint, &[("access_key", &self.api_key)])
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let text = response.text().await?;
        let data: LatestRatesResponse = serde_json::from_str(&text)?;

        let rates = data.rates.ok_or_else(|| FetchError::MissingRates {
            info: data.error.as_ref().and_then(ApiErrorBody::describe),
        })?;

        let date = data
            .date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
        let base = data.base.as_deref().unwrap_or(BASE_CURRENCY);

        let table = RateTable::with_details(base, date, rates);
        debug!(count = table.len(), %base, ?date, "Received exchange rates");
        Ok(table)
    }
}
