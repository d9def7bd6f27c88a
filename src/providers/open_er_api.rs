use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::currency::{CurrencyCode, RateProvider, RateQuote};
use crate::core::error::ConversionError;

/// Rate provider for the open.er-api.com `latest` endpoint, or anything
/// that speaks the same format.
pub struct OpenErApiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OpenErApiProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("xconv/1.0")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(OpenErApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[derive(Deserialize, Debug)]
struct OpenErApiResponse {
    result: String,
    base_code: Option<String>,
    rates: Option<HashMap<String, f64>>,
    time_last_update_unix: Option<i64>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

impl OpenErApiResponse {
    fn into_quote(self, base: &CurrencyCode) -> Result<RateQuote, ConversionError> {
        if self.result != "success" {
            return Err(ConversionError::ProviderError(
                self.error_type
                    .unwrap_or_else(|| format!("result '{}'", self.result)),
            ));
        }

        let rates = self.rates.ok_or_else(|| {
            ConversionError::MalformedResponse(format!("no rates in response for {base}"))
        })?;

        if let Some(code) = self.base_code.as_deref() {
            if code != base.as_str() {
                debug!(requested = %base, returned = code, "Provider answered for a different base");
            }
        }

        Ok(RateQuote {
            base: base.clone(),
            rates,
            updated_at: self
                .time_last_update_unix
                .and_then(|ts| Utc.timestamp_opt(ts, 0).single()),
        })
    }
}

#[async_trait]
impl RateProvider for OpenErApiProvider {
    #[instrument(
        name = "OpenErApiFetch",
        skip(self),
        fields(base = %base)
    )]
    async fn fetch_rates(&self, base: &CurrencyCode) -> Result<RateQuote, ConversionError> {
        let url = format!("{}/{}", self.base_url, base);
        debug!("Requesting rates from {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        debug!(%status, "Received rates response");

        let text = response.text().await?;

        if !status.is_success() {
            // Error envelopes still carry an error-type worth showing
            if let Ok(envelope) = serde_json::from_str::<OpenErApiResponse>(&text) {
                if let Some(error_type) = envelope.error_type {
                    return Err(ConversionError::ProviderError(error_type));
                }
            }
            return Err(ConversionError::NetworkFailure(format!(
                "HTTP error: {status} for base currency: {base}"
            )));
        }

        if text.trim().is_empty() {
            return Err(ConversionError::MalformedResponse(
                "empty response body".to_string(),
            ));
        }

        let data: OpenErApiResponse = serde_json::from_str(&text).map_err(|e| {
            ConversionError::MalformedResponse(format!(
                "failed to parse JSON response for {base}: {e}"
            ))
        })?;

        data.into_quote(base)
    }
}
