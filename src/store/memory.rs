use crate::core::store::KeyValueStore;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// In-memory store. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let value = values.get(key).cloned();
        debug!(key, hit = value.is_some(), "Store GET");
        value
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(key, value, "Store SET");
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
