pub mod disk;
pub mod memory;

use crate::core::store::KeyValueStore;
use anyhow::{Context, Result};
use disk::DiskStore;
use fjall::PartitionCreateOptions;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const SECRETS_PARTITION: &str = "secrets";
const SETTINGS_PARTITION: &str = "settings";

/// The two stores the revenue manager needs, sharing one backing keyspace.
pub struct Stores {
    pub secrets: Arc<dyn KeyValueStore>,
    pub settings: Arc<dyn KeyValueStore>,
}

impl Stores {
    /// Opens (creating if missing) the persistent stores under `data_path`.
    pub fn open(data_path: &Path) -> Result<Self> {
        let store_dir = data_path.join("store");
        std::fs::create_dir_all(&store_dir)
            .with_context(|| format!("Failed to create directory: {}", store_dir.display()))?;

        let keyspace = Arc::new(
            fjall::Config::new(&store_dir)
                .open()
                .with_context(|| format!("Failed to open store at {}", store_dir.display()))?,
        );
        let secrets = keyspace
            .open_partition(SECRETS_PARTITION, PartitionCreateOptions::default())
            .context("Failed to open secrets partition")?;
        let settings = keyspace
            .open_partition(SETTINGS_PARTITION, PartitionCreateOptions::default())
            .context("Failed to open settings partition")?;
        debug!("Opened stores at {}", store_dir.display());

        Ok(Self {
            secrets: Arc::new(DiskStore::new(Arc::clone(&keyspace), secrets)),
            settings: Arc::new(DiskStore::new(keyspace, settings)),
        })
    }

    /// Non-persistent stores, one map each.
    pub fn in_memory() -> Self {
        Self {
            secrets: Arc::new(memory::MemoryStore::new()),
            settings: Arc::new(memory::MemoryStore::new()),
        }
    }
}
