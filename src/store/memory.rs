use crate::core::store::KeyValueStore;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// In-memory store; contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            inner: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let map = self.inner.read().ok()?;
        map.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| anyhow::anyhow!("Memory store lock poisoned"))?;
        map.insert(key.to_string(), value.to_string());
        debug!(key, "Store SET");
        Ok(())
    }
}
