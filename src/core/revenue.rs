//! Revenue abstractions shared by every billing source

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;
use thiserror::Error;

/// Identifies one external revenue provider.
///
/// The declaration order is the order in which per-source outcomes are merged
/// after a refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Stripe,
    Polar,
}

impl SourceId {
    pub const ALL: [SourceId; 2] = [SourceId::Stripe, SourceId::Polar];

    /// Name of the secret holding this source's credential.
    pub fn credential_name(&self) -> &'static str {
        match self {
            SourceId::Stripe => "stripe_secret_key",
            SourceId::Polar => "polar_access_token",
        }
    }

    /// Human-facing label used in error messages and the breakdown.
    pub fn label(&self) -> &'static str {
        match self {
            SourceId::Stripe => "Stripe",
            SourceId::Polar => "Polar",
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SourceId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stripe" => Ok(SourceId::Stripe),
            "polar" | "polar.sh" => Ok(SourceId::Polar),
            _ => Err(anyhow::anyhow!("Unknown revenue source: {}", s)),
        }
    }
}

/// Revenue over the most recent page of transactions of a single source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueStats {
    /// Major currency units, exact to the cent.
    pub revenue: Decimal,
    pub order_count: u64,
}

impl RevenueStats {
    /// Reduces wire amounts, given in minor units, to major-unit stats.
    pub fn from_minor_units<I>(amounts: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        let (cents, count) = amounts
            .into_iter()
            .fold((0i128, 0u64), |(sum, n), amount| (sum + amount as i128, n + 1));

        Self {
            revenue: Decimal::from_i128_with_scale(cents, 2),
            order_count: count,
        }
    }
}

impl Add for RevenueStats {
    type Output = RevenueStats;

    fn add(self, rhs: Self) -> Self::Output {
        RevenueStats {
            revenue: self.revenue + rhs.revenue,
            order_count: self.order_count + rhs.order_count,
        }
    }
}

impl Sum for RevenueStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(RevenueStats::default(), Add::add)
    }
}

/// Failure of a single source fetch.
///
/// Messages never carry the credential; HTTP bodies are truncated before
/// they get here.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Credentials handed to a source for the duration of one fetch.
#[derive(Clone, Default)]
pub struct Credentials {
    pub secret: String,
    pub organization_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("secret", &"<redacted>")
            .field("organization_id", &self.organization_id)
            .finish()
    }
}

#[async_trait]
pub trait RevenueSource: Send + Sync {
    fn id(&self) -> SourceId;

    async fn fetch_stats(&self, credentials: &Credentials) -> Result<RevenueStats, SourceError>;
}
