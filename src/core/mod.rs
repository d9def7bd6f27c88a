//! Core conversion logic and abstractions

pub mod config;
pub mod converter;
pub mod currency;
pub mod error;
pub mod log;
pub mod store;

// Re-export main types for cleaner imports
pub use converter::{ConversionOutcome, ConversionPhase, ConversionState, ConversionViewModel};
pub use currency::{CurrencyCode, RateProvider, RateQuote};
pub use error::ConversionError;
pub use store::KeyValueStore;
