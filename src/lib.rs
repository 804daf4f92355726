pub mod cli;
pub mod core;
pub mod manager;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::revenue::SourceId;
use crate::manager::RevenueManager;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Status,
    Watch,
    SetCredential { source: SourceId, value: String },
    SetOrganizationId(String),
    SetInterval(u64),
}

/// Wires the configured sources and persistent stores into a manager.
pub fn build_manager(config: &AppConfig) -> Result<RevenueManager> {
    let stores = store::Stores::open(&config.data_path()?)?;
    let sources = providers::build_sources(&config.providers)?;
    Ok(RevenueManager::new(sources, stores.secrets, stores.settings))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("revbar starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let manager = build_manager(&config)?;

    match command {
        AppCommand::Status => cli::status::run_status(&manager).await,
        AppCommand::Watch => cli::status::run_watch(&manager).await,
        AppCommand::SetCredential { source, value } => {
            cli::settings::set_credential(&manager, source, &value)
        }
        AppCommand::SetOrganizationId(id) => cli::settings::set_organization_id(&manager, &id),
        AppCommand::SetInterval(secs) => cli::settings::set_refresh_interval(&manager, secs),
    }
}
