//! Error taxonomy for a single conversion attempt.

use thiserror::Error;

/// Everything that can go wrong while converting an amount.
///
/// All variants are recovered by the view-model and surfaced through its
/// `error_message`; none of them terminate the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("Invalid amount: '{0}'")]
    InvalidAmount(String),

    #[error("Invalid currency code: '{0}'")]
    InvalidCurrency(String),

    #[error("Network error: {0}")]
    NetworkFailure(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Rate provider error: {0}")]
    ProviderError(String),

    #[error("Rate unavailable for target currency: {0}")]
    RateUnavailable(String),

    #[error("Converted amount out of range: {0}")]
    ResultOutOfRange(String),
}

impl From<reqwest::Error> for ConversionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ConversionError::NetworkFailure(format!("request timed out: {e}"))
        } else {
            ConversionError::NetworkFailure(e.to_string())
        }
    }
}
