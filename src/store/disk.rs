use crate::core::store::KeyValueStore;
use anyhow::{Context, Result};
use fjall::{Keyspace, PartitionHandle, PersistMode};
use std::sync::Arc;
use tracing::debug;

/// A single fjall partition exposed as a string key-value store.
pub struct DiskStore {
    keyspace: Arc<Keyspace>,
    partition: PartitionHandle,
}

impl DiskStore {
    pub fn new(keyspace: Arc<Keyspace>, partition: PartitionHandle) -> Self {
        Self {
            keyspace,
            partition,
        }
    }
}

impl KeyValueStore for DiskStore {
    fn get(&self, key: &str) -> Option<String> {
        let res: Result<Option<String>> = (|| {
            match self.partition.get(key)? {
                Some(bytes) => Ok(Some(String::from_utf8(bytes.to_vec())?)),
                None => Ok(None),
            }
        })();

        match res {
            Ok(val) => {
                debug!(key, hit = val.is_some(), "Store GET");
                val
            }
            Err(e) => {
                debug!("DiskStore get error for {}: {}", key, e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.partition
            .insert(key, value)
            .with_context(|| format!("Failed to write {key}"))?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to flush store to disk")?;
        debug!(key, "Store SET");
        Ok(())
    }
}
