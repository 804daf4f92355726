use super::ui;
use crate::core::currency::format_currency;
use crate::core::revenue::SourceId;
use crate::core::state::AggregateState;
use crate::manager::{RefreshOutcome, RevenueManager};
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::Cell;
use tracing::debug;

const NO_CREDENTIALS_HINT: &str =
    "No API keys configured. Add one with `revbar set-credential <stripe|polar> <value>`.";

/// Renders the revenue breakdown for the configured sources.
pub fn render_status(
    state: &AggregateState,
    configured: &[SourceId],
    now: DateTime<Utc>,
) -> String {
    if configured.is_empty() {
        return ui::style_text(NO_CREDENTIALS_HINT, ui::StyleType::Subtle);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Source"),
        ui::header_cell("Orders"),
        ui::header_cell("Revenue (USD)"),
    ]);

    for source in configured {
        let stats = state.stats(*source);
        table.add_row(vec![
            Cell::new(source.label()),
            ui::amount_cell(stats.order_count.to_string()),
            ui::amount_cell(format_currency(stats.revenue)),
        ]);
    }
    table.add_row(vec![
        Cell::new(ui::style_text("Total", ui::StyleType::TotalLabel)),
        ui::total_cell(state.total_orders().to_string()),
        ui::total_cell(format_currency(state.total_revenue())),
    ]);

    let mut output = format!(
        "{}\n\n",
        ui::style_text("Recent Revenue", ui::StyleType::Title)
    );
    output.push_str(&format!(
        "Total Revenue: {}\n",
        ui::style_text(
            &format_currency(state.total_revenue()),
            ui::StyleType::TotalValue
        )
    ));
    if let Some(avg) = state.average_order_value() {
        output.push_str(&format!(
            "Avg Order: {}\n",
            ui::style_text(&format_currency(avg), ui::StyleType::TotalLabel)
        ));
    }
    output.push('\n');
    output.push_str(&table.to_string());

    if let Some(error) = &state.last_error {
        output.push_str(&format!(
            "\n\n{}",
            ui::style_text(error, ui::StyleType::Error)
        ));
    }
    if let Some(updated) = state.last_updated {
        output.push_str(&format!(
            "\n\n{}",
            ui::style_text(
                &format!("Updated {}", ui::relative_time(updated, now)),
                ui::StyleType::Subtle
            )
        ));
    }
    output
}

/// One refresh, then print the breakdown.
pub async fn run_status(manager: &RevenueManager) -> Result<()> {
    let outcome = if manager.has_credentials() {
        let spinner = ui::new_spinner("Fetching revenue...");
        let outcome = manager.refresh_now().await;
        spinner.finish_and_clear();
        outcome
    } else {
        RefreshOutcome::NoCredentials
    };
    debug!(?outcome, "Refresh finished");

    println!(
        "{}",
        render_status(&manager.snapshot(), &manager.configured_sources(), Utc::now())
    );
    Ok(())
}

/// Refreshes on the configured interval and re-renders after every cycle
/// until interrupted.
pub async fn run_watch(manager: &RevenueManager) -> Result<()> {
    let mut updates = manager.subscribe();
    let interval = manager.refresh_interval_secs();

    println!(
        "{}",
        ui::style_text(
            &format!("Refreshing every {interval}s, press Ctrl-C to stop"),
            ui::StyleType::Subtle
        )
    );
    manager.start().await;
    print_snapshot(manager);
    updates.borrow_and_update();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let loading = updates.borrow_and_update().is_loading;
                if !loading {
                    print_snapshot(manager);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted, stopping auto-refresh");
                break;
            }
        }
    }

    manager.stop_auto_refresh();
    Ok(())
}

fn print_snapshot(manager: &RevenueManager) {
    println!(
        "\n{}",
        render_status(&manager.snapshot(), &manager.configured_sources(), Utc::now())
    );
}
