pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::store::KeyValueStore;
use disk::DiskStore;
use memory::MemoryStore;
use std::sync::Arc;
use tracing::warn;

/// Opens the on-disk store under the configured data path.
///
/// Falls back to an in-memory store when the data directory is unusable, so
/// conversions still work but the selection is not remembered.
pub fn open_store(config: &AppConfig) -> Arc<dyn KeyValueStore> {
    let opened = config
        .default_data_path()
        .and_then(|path| DiskStore::open(&path.join("store")));

    match opened {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, "Falling back to in-memory store");
            Arc::new(MemoryStore::new())
        }
    }
}
