//! Key-value persistence abstraction for the last used currency selection.

use anyhow::Result;

/// Key holding the last used source currency.
pub const FROM_CURRENCY_KEY: &str = "fromCurrency_last";
/// Key holding the last used target currency.
pub const TO_CURRENCY_KEY: &str = "toCurrency_last";

/// A string-to-string store that survives process restarts.
///
/// Writes are independent of each other; the last write for a key wins.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}
