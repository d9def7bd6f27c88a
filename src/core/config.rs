use crate::core::currency::CurrencyCode;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://open.er-api.com/v6/latest";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeRateProviderConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ExchangeRateProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ExchangeRateProviderConfig {
    fn default() -> Self {
        ExchangeRateProviderConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub exchange_rate: ExchangeRateProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_from")]
    pub default_from: CurrencyCode,
    #[serde(default = "default_to")]
    pub default_to: CurrencyCode,
    #[serde(default = "default_currencies")]
    pub currencies: Vec<CurrencyCode>,
    pub data_path: Option<String>,
}

fn default_from() -> CurrencyCode {
    CurrencyCode::from_static("USD")
}

fn default_to() -> CurrencyCode {
    CurrencyCode::from_static("EUR")
}

fn default_currencies() -> Vec<CurrencyCode> {
    ["USD", "EUR", "NGN", "GBP", "JPY"]
        .into_iter()
        .map(CurrencyCode::from_static)
        .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            default_from: default_from(),
            default_to: default_to(),
            currencies: default_currencies(),
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to the
    /// built-in defaults when no config file has been created yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "xconv", "xconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "xconv", "xconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(
            config.providers.exchange_rate.base_url,
            "https://open.er-api.com/v6/latest"
        );
        assert_eq!(config.providers.exchange_rate.timeout(), Duration::from_secs(10));
        assert_eq!(config.default_from.as_str(), "USD");
        assert_eq!(config.default_to.as_str(), "EUR");
        let currencies: Vec<&str> = config.currencies.iter().map(|c| c.as_str()).collect();
        assert_eq!(currencies, vec!["USD", "EUR", "NGN", "GBP", "JPY"]);
        assert!(config.data_path.is_none());
    }

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
providers:
  exchange_rate:
    base_url: "http://example.com/rates"
    timeout_secs: 3
default_from: "gbp"
default_to: "JPY"
currencies: ["GBP", "JPY", "CHF"]
data_path: "/tmp/xconv"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(
            config.providers.exchange_rate.base_url,
            "http://example.com/rates"
        );
        assert_eq!(config.providers.exchange_rate.timeout_secs, 3);
        assert_eq!(config.default_from.as_str(), "GBP");
        assert_eq!(config.default_to.as_str(), "JPY");
        assert_eq!(config.currencies.len(), 3);
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/xconv")
        );
    }

    #[test]
    fn test_config_rejects_bad_currency() {
        let yaml_str = r#"
default_from: "dollars"
"#;
        assert!(serde_yaml::from_str::<AppConfig>(yaml_str).is_err());
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load_from_path(dir.path().join("missing.yaml"));
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
