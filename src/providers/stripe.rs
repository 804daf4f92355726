use super::util::{self, PAGE_SIZE};
use crate::core::revenue::{Credentials, RevenueSource, RevenueStats, SourceError, SourceId};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct ChargeList {
    data: Vec<Charge>,
}

#[derive(Debug, Deserialize)]
struct Charge {
    amount: i64,
    status: String,
    refunded: bool,
}

impl Charge {
    fn is_settled(&self) -> bool {
        self.status == "succeeded" && !self.refunded
    }
}

/// Payments processor client reading the most recent charges.
pub struct StripeClient {
    endpoint: Url,
    client: reqwest::Client,
}

impl StripeClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Ok(StripeClient {
            endpoint: util::endpoint_url(base_url, "v1/charges")?,
            client: util::http_client(),
        })
    }
}

#[async_trait]
impl RevenueSource for StripeClient {
    fn id(&self) -> SourceId {
        SourceId::Stripe
    }

    #[instrument(name = "StripeFetch", skip(self, credentials))]
    async fn fetch_stats(&self, credentials: &Credentials) -> Result<RevenueStats, SourceError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("limit", &PAGE_SIZE.to_string());
        debug!("Requesting charges from {}", url);

        let request = self.client.get(url).bearer_auth(&credentials.secret);
        let charges: ChargeList = util::get_json(
            request,
            &[StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN],
            "Invalid API key",
        )
        .await?;

        let stats = RevenueStats::from_minor_units(
            charges
                .data
                .iter()
                .filter(|c| c.is_settled())
                .map(|c| c.amount),
        );
        debug!(
            charges = charges.data.len(),
            orders = stats.order_count,
            "Reduced Stripe charges"
        );
        Ok(stats)
    }
}
