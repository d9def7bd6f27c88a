use crate::core::store::KeyValueStore;
use anyhow::{Context, Result};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION_NAME: &str = "selections";

/// Store backed by a fjall keyspace on disk.
pub struct DiskStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create store directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        let partition = keyspace
            .open_partition(PARTITION_NAME, PartitionCreateOptions::default())
            .context("Failed to open store partition")?;
        debug!(path = %path.display(), "Opened disk store");

        Ok(Self {
            keyspace,
            partition,
        })
    }
}

impl KeyValueStore for DiskStore {
    fn get(&self, key: &str) -> Option<String> {
        let res: Result<Option<String>> = (|| {
            let Some(value) = self.partition.get(key)? else {
                return Ok(None);
            };
            Ok(Some(String::from_utf8(value.to_vec())?))
        })();

        match res {
            Ok(value) => {
                debug!(key, hit = value.is_some(), "Store GET");
                value
            }
            Err(e) => {
                debug!(key, error = %e, "DiskStore get error");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.partition
            .insert(key, value)
            .with_context(|| format!("Failed to write key: {key}"))?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist store")?;
        debug!(key, value, "Store SET");
        Ok(())
    }
}
