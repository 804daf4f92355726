use super::ui;
use crate::core::revenue::SourceId;
use crate::manager::RevenueManager;
use anyhow::{Context, Result};
use std::io::Read;

/// Reads a credential from stdin when none was given on the command line,
/// keeping it out of shell history.
pub fn read_secret(value: Option<String>) -> Result<String> {
    match value {
        Some(v) if v != "-" => Ok(v),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read credential from stdin")?;
            Ok(buf.trim_end_matches(['\r', '\n']).to_string())
        }
    }
}

pub fn set_credential(manager: &RevenueManager, source: SourceId, value: &str) -> Result<()> {
    manager
        .set_credential(source, value)
        .with_context(|| format!("Failed to store {source} credential"))?;

    let message = if value.is_empty() {
        format!("Removed {source} credential")
    } else {
        format!("Saved {source} credential")
    };
    println!("{}", ui::style_text(&message, ui::StyleType::TotalLabel));
    Ok(())
}

pub fn set_organization_id(manager: &RevenueManager, id: &str) -> Result<()> {
    manager
        .set_organization_id(id)
        .context("Failed to store organization id")?;
    println!(
        "{}",
        ui::style_text(
            &format!("Organization id set to '{}'", manager.organization_id()),
            ui::StyleType::TotalLabel
        )
    );
    Ok(())
}

pub fn set_refresh_interval(manager: &RevenueManager, secs: u64) -> Result<()> {
    manager.set_refresh_interval(secs)?;
    println!(
        "{}",
        ui::style_text(
            &format!("Refresh interval set to {secs}s"),
            ui::StyleType::TotalLabel
        )
    );
    Ok(())
}
