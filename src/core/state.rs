use crate::core::revenue::{RevenueStats, SourceId};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;

/// Snapshot of everything a presentation layer may show.
///
/// Totals are derived from `per_source` on every read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateState {
    pub per_source: BTreeMap<SourceId, RevenueStats>,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub is_loading: bool,
}

impl AggregateState {
    /// Stats for a source; zero if it has never been fetched.
    pub fn stats(&self, source: SourceId) -> RevenueStats {
        self.per_source.get(&source).copied().unwrap_or_default()
    }

    pub fn total_revenue(&self) -> Decimal {
        self.per_source.values().map(|s| s.revenue).sum()
    }

    pub fn total_orders(&self) -> u64 {
        self.per_source.values().map(|s| s.order_count).sum()
    }

    /// Average revenue per order, rounded to the cent.
    pub fn average_order_value(&self) -> Option<Decimal> {
        let orders = self.total_orders();
        if orders == 0 {
            return None;
        }
        let avg = self.total_revenue() / Decimal::from(orders);
        Some(avg.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}
