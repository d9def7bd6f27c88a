//! The conversion view-model.
//!
//! [`ConversionViewModel`] owns the [`ConversionState`] a presentation layer
//! renders. It validates the amount, asks a [`RateProvider`] for rates, applies
//! the result in a single state update and remembers the currency pair in a
//! [`KeyValueStore`].

use crate::core::currency::{CurrencyCode, RateProvider};
use crate::core::error::ConversionError;
use crate::core::store::{FROM_CURRENCY_KEY, KeyValueStore, TO_CURRENCY_KEY};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

const DEFAULT_AMOUNT_TEXT: &str = "100.00";

/// Where the current conversion attempt stands.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConversionPhase {
    #[default]
    Idle,
    Loading,
    Success,
    Failed(ConversionError),
}

/// Everything a presentation layer needs to render the converter.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionState {
    pub source_currency: CurrencyCode,
    pub target_currency: CurrencyCode,
    pub amount_text: String,
    pub converted_amount: Option<f64>,
    /// Rate used for `converted_amount`.
    pub rate: Option<f64>,
    /// Provider's timestamp for `rate`, when it sends one.
    pub rates_updated_at: Option<DateTime<Utc>>,
    /// Empty when there is no error to show.
    pub error_message: String,
    pub phase: ConversionPhase,
}

impl ConversionState {
    fn new(source_currency: CurrencyCode, target_currency: CurrencyCode) -> Self {
        Self {
            source_currency,
            target_currency,
            amount_text: DEFAULT_AMOUNT_TEXT.to_string(),
            converted_amount: None,
            rate: None,
            rates_updated_at: None,
            error_message: String::new(),
            phase: ConversionPhase::Idle,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == ConversionPhase::Loading
    }
}

/// What a single `convert` call ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    Converted { amount: f64, rate: f64 },
    /// Input was rejected before any request was made. State is untouched.
    Rejected(ConversionError),
    Failed(ConversionError),
    /// A newer conversion started before this one finished; its result was dropped.
    Superseded,
}

pub struct ConversionViewModel {
    provider: Arc<dyn RateProvider>,
    store: Arc<dyn KeyValueStore>,
    fallback_from: CurrencyCode,
    fallback_to: CurrencyCode,
    state: watch::Sender<ConversionState>,
    generation: watch::Sender<u64>,
}

impl ConversionViewModel {
    /// Creates the view-model and seeds its currencies from the store.
    pub fn new(
        provider: Arc<dyn RateProvider>,
        store: Arc<dyn KeyValueStore>,
        fallback_from: CurrencyCode,
        fallback_to: CurrencyCode,
    ) -> Self {
        let state = watch::Sender::new(ConversionState::new(
            fallback_from.clone(),
            fallback_to.clone(),
        ));
        let view_model = Self {
            provider,
            store,
            fallback_from,
            fallback_to,
            state,
            generation: watch::Sender::new(0),
        };
        view_model.initialize();
        view_model
    }

    /// Loads the last used currency pair, using the fallback pair for
    /// anything missing or unreadable.
    pub fn initialize(&self) {
        let source = self
            .stored_currency(FROM_CURRENCY_KEY)
            .unwrap_or_else(|| self.fallback_from.clone());
        let target = self
            .stored_currency(TO_CURRENCY_KEY)
            .unwrap_or_else(|| self.fallback_to.clone());
        debug!(%source, %target, "Initialized currency selection");

        self.state.send_modify(|s| {
            s.source_currency = source;
            s.target_currency = target;
        });
    }

    fn stored_currency(&self, key: &str) -> Option<CurrencyCode> {
        let value = self.store.get(key)?;
        match value.parse() {
            Ok(code) => Some(code),
            Err(e) => {
                warn!(key, error = %e, "Ignoring stored currency");
                None
            }
        }
    }

    /// Read-only copy of the current state.
    pub fn snapshot(&self) -> ConversionState {
        self.state.borrow().clone()
    }

    /// Receiver that is notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<ConversionState> {
        self.state.subscribe()
    }

    pub fn set_amount_text(&self, amount_text: impl Into<String>) {
        let amount_text = amount_text.into();
        self.state.send_modify(|s| s.amount_text = amount_text);
    }

    pub fn set_source_currency(&self, code: CurrencyCode) {
        self.state.send_modify(|s| s.source_currency = code);
    }

    pub fn set_target_currency(&self, code: CurrencyCode) {
        self.state.send_modify(|s| s.target_currency = code);
    }

    pub fn swap_currencies(&self) {
        self.state.send_modify(|s| {
            std::mem::swap(&mut s.source_currency, &mut s.target_currency);
        });
    }

    /// Updates all three inputs at once, then converts.
    pub async fn convert_with(
        &self,
        amount_text: impl Into<String>,
        source: CurrencyCode,
        target: CurrencyCode,
    ) -> ConversionOutcome {
        let amount_text = amount_text.into();
        self.state.send_modify(|s| {
            s.amount_text = amount_text;
            s.source_currency = source;
            s.target_currency = target;
        });
        self.convert().await
    }

    /// Converts the current amount from the source into the target currency.
    ///
    /// An amount that is not a finite, non-negative number is rejected
    /// without touching the state or the network. Starting a conversion
    /// cancels any conversion still in flight.
    #[instrument(name = "Convert", skip(self))]
    pub async fn convert(&self) -> ConversionOutcome {
        let (amount_text, source, target) = {
            let s = self.state.borrow();
            (
                s.amount_text.clone(),
                s.source_currency.clone(),
                s.target_currency.clone(),
            )
        };

        let amount = match parse_amount(&amount_text) {
            Ok(amount) => amount,
            Err(e) => {
                debug!(error = %e, "Not converting");
                return ConversionOutcome::Rejected(e);
            }
        };

        let generation = self.next_generation();
        self.state.send_modify(|s| {
            s.phase = ConversionPhase::Loading;
            s.error_message.clear();
        });
        let _loading = LoadingGuard {
            view_model: self,
            generation,
        };
        debug!(generation, %source, %target, amount, "Fetching rates");

        let fetched = tokio::select! {
            res = self.provider.fetch_rates(&source) => res,
            _ = superseded(self.generation.subscribe(), generation) => {
                debug!(generation, "Conversion superseded while in flight");
                return ConversionOutcome::Superseded;
            }
        };

        let result = fetched.and_then(|quote| {
            let rate = quote.rate_for(&target)?;
            let converted = amount * rate;
            if !converted.is_finite() {
                return Err(ConversionError::ResultOutOfRange(format!(
                    "{amount_text} {source} at {rate}"
                )));
            }
            Ok((rate, converted, quote.updated_at))
        });

        match result {
            Ok((rate, converted, updated_at)) => {
                let applied = self.apply(generation, |s| {
                    s.converted_amount = Some(converted);
                    s.rate = Some(rate);
                    s.rates_updated_at = updated_at;
                    s.error_message.clear();
                    s.phase = ConversionPhase::Success;
                });
                if !applied {
                    return ConversionOutcome::Superseded;
                }
                info!(%source, %target, amount, rate, converted, "Converted");
                self.persist_selection(&source, &target);
                ConversionOutcome::Converted {
                    amount: converted,
                    rate,
                }
            }
            Err(e) => {
                let message = e.to_string();
                let phase = ConversionPhase::Failed(e.clone());
                let applied = self.apply(generation, |s| {
                    s.converted_amount = None;
                    s.rate = None;
                    s.rates_updated_at = None;
                    s.error_message = message;
                    s.phase = phase;
                });
                if !applied {
                    return ConversionOutcome::Superseded;
                }
                warn!(error = %e, %source, %target, "Conversion failed");
                ConversionOutcome::Failed(e)
            }
        }
    }

    fn next_generation(&self) -> u64 {
        let mut current = 0;
        self.generation.send_modify(|g| {
            *g += 1;
            current = *g;
        });
        current
    }

    /// Applies `update` in one step if `generation` is still the newest
    /// conversion. Returns whether it was applied.
    fn apply(&self, generation: u64, update: impl FnOnce(&mut ConversionState)) -> bool {
        self.state.send_if_modified(|s| {
            if *self.generation.borrow() != generation {
                return false;
            }
            update(s);
            true
        })
    }

    fn persist_selection(&self, source: &CurrencyCode, target: &CurrencyCode) {
        for (key, code) in [(FROM_CURRENCY_KEY, source), (TO_CURRENCY_KEY, target)] {
            if let Err(e) = self.store.set(key, code.as_str()) {
                warn!(key, error = %e, "Failed to persist currency selection");
            }
        }
    }
}

/// Puts the view-model back to `Idle` when a conversion is dropped while it
/// is still the newest one and still loading, e.g. by a caller's timeout.
struct LoadingGuard<'a> {
    view_model: &'a ConversionViewModel,
    generation: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let generation = self.generation;
        let reset = self.view_model.state.send_if_modified(|s| {
            if *self.view_model.generation.borrow() != generation || !s.is_loading() {
                return false;
            }
            s.phase = ConversionPhase::Idle;
            true
        });
        if reset {
            debug!(generation, "Conversion dropped while loading");
        }
    }
}

fn parse_amount(text: &str) -> Result<f64, ConversionError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
        .ok_or_else(|| ConversionError::InvalidAmount(text.to_string()))
}

/// Resolves once a conversion newer than `current` has started.
async fn superseded(mut generations: watch::Receiver<u64>, current: u64) {
    if generations.wait_for(|g| *g != current).await.is_err() {
        // Sender gone: nothing can supersede us any more.
        std::future::pending::<()>().await;
    }
}
