use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_STRIPE_BASE_URL: &str = "https://api.stripe.com";
pub const DEFAULT_POLAR_BASE_URL: &str = "https://api.polar.sh";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub stripe: Option<ProviderConfig>,
    pub polar: Option<ProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            stripe: Some(ProviderConfig {
                base_url: DEFAULT_STRIPE_BASE_URL.to_string(),
            }),
            polar: Some(ProviderConfig {
                base_url: DEFAULT_POLAR_BASE_URL.to_string(),
            }),
        }
    }
}

impl ProvidersConfig {
    pub fn stripe_base_url(&self) -> &str {
        self.stripe
            .as_ref()
            .map_or(DEFAULT_STRIPE_BASE_URL, |p| p.base_url.as_str())
    }

    pub fn polar_base_url(&self) -> &str {
        self.polar
            .as_ref()
            .map_or(DEFAULT_POLAR_BASE_URL, |p| p.base_url.as_str())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Directory holding the secret and settings stores.
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "revbar", "revbar")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "revbar", "revbar")
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
