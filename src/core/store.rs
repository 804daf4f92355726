//! Key-value storage abstractions for secrets and user settings

use anyhow::Result;
use std::sync::Arc;
use tracing::warn;

/// A string-keyed store. Secrets and settings each live in their own instance.
///
/// A missing key is not an error; callers treat it as empty or default.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;

const ORGANIZATION_ID_KEY: &str = "organization_id";
const REFRESH_INTERVAL_KEY: &str = "refresh_interval_seconds";

/// Typed view over the persisted user settings.
#[derive(Clone)]
pub struct Settings {
    store: Arc<dyn KeyValueStore>,
}

impl Settings {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn organization_id(&self) -> String {
        self.store.get(ORGANIZATION_ID_KEY).unwrap_or_default()
    }

    pub fn set_organization_id(&self, id: &str) -> Result<()> {
        self.store.set(ORGANIZATION_ID_KEY, id.trim())
    }

    pub fn refresh_interval_secs(&self) -> u64 {
        match self.store.get(REFRESH_INTERVAL_KEY) {
            None => DEFAULT_REFRESH_INTERVAL_SECS,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    warn!(value = %raw, "Ignoring invalid stored refresh interval");
                    DEFAULT_REFRESH_INTERVAL_SECS
                }
            },
        }
    }

    pub fn set_refresh_interval_secs(&self, secs: u64) -> Result<()> {
        if secs == 0 {
            anyhow::bail!("Refresh interval must be a positive number of seconds");
        }
        self.store.set(REFRESH_INTERVAL_KEY, &secs.to_string())
    }
}
