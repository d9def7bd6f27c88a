pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::{ConversionViewModel, CurrencyCode};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Convert {
        amount: String,
        from: Option<String>,
        to: Option<String>,
    },
    Last,
    Currencies,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Currency converter starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let view_model = build_view_model(&config)?;

    match command {
        AppCommand::Convert { amount, from, to } => {
            let from = from.as_deref().map(str::parse::<CurrencyCode>).transpose()?;
            let to = to.as_deref().map(str::parse::<CurrencyCode>).transpose()?;
            cli::convert::run(&view_model, &amount, from, to).await
        }
        AppCommand::Last => {
            cli::selection::run(&view_model.snapshot());
            Ok(())
        }
        AppCommand::Currencies => {
            cli::currencies::run(&config.currencies, &view_model.snapshot());
            Ok(())
        }
    }
}

/// Wires the configured rate provider and store into a view-model.
pub fn build_view_model(config: &AppConfig) -> Result<ConversionViewModel> {
    let provider_config = &config.providers.exchange_rate;
    let provider = providers::open_er_api::OpenErApiProvider::new(
        &provider_config.base_url,
        provider_config.timeout(),
    )?;
    let store = store::open_store(config);

    Ok(ConversionViewModel::new(
        Arc::new(provider),
        store,
        config.default_from.clone(),
        config.default_to.clone(),
    ))
}
