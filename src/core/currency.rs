//! Currency codes, rate quotes and the rate provider abstraction

use crate::core::error::ConversionError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

/// A 3 or 4 letter currency identifier, always upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Builds a code from a literal that is already upper case and valid.
    pub(crate) fn from_static(code: &'static str) -> Self {
        debug_assert!(code.parse::<CurrencyCode>().is_ok_and(|c| c.0 == code));
        CurrencyCode(code.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CurrencyCode {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if (3..=4).contains(&code.len()) && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(CurrencyCode(code.to_ascii_uppercase()))
        } else {
            Err(ConversionError::InvalidCurrency(s.to_string()))
        }
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rates for one base currency, as returned by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RateQuote {
    pub base: CurrencyCode,
    pub rates: HashMap<String, f64>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RateQuote {
    /// Looks up the rate from the base currency into `target`.
    pub fn rate_for(&self, target: &CurrencyCode) -> Result<f64, ConversionError> {
        let rate = *self
            .rates
            .get(target.as_str())
            .ok_or_else(|| ConversionError::RateUnavailable(target.to_string()))?;

        if !rate.is_finite() || rate <= 0.0 {
            return Err(ConversionError::MalformedResponse(format!(
                "invalid rate {rate} for {target}"
            )));
        }
        Ok(rate)
    }
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rates(&self, base: &CurrencyCode) -> Result<RateQuote, ConversionError>;
}
