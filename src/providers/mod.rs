pub mod polar;
pub mod stripe;
pub mod util;

use crate::core::config::ProvidersConfig;
use crate::core::revenue::RevenueSource;
use anyhow::Result;
use std::sync::Arc;

/// Builds every revenue source from the configured endpoints, in merge order.
pub fn build_sources(config: &ProvidersConfig) -> Result<Vec<Arc<dyn RevenueSource>>> {
    let stripe: Arc<dyn RevenueSource> =
        Arc::new(stripe::StripeClient::new(config.stripe_base_url())?);
    let polar: Arc<dyn RevenueSource> = Arc::new(polar::PolarClient::new(config.polar_base_url())?);
    Ok(vec![stripe, polar])
}
