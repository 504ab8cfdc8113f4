use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use crate::pricing::error::{PricingError, PricingResult};
use crate::pricing::package::{quote_package, PackageQuote};
use crate::pricing::resolver::{resolve_batch, resolve_price};
use crate::pricing::store::CampaignStore;
use crate::pricing::types::{CampaignScope, PriceResolution, PricedProduct};

/// Service for campaign-aware product pricing
///
/// Captures the clock once per call and hands it to the pure resolver.
/// Store failures are returned as errors, never replaced by a default price.
#[derive(Clone)]
pub struct PricingService {
    store: Arc<dyn CampaignStore>,
}

impl PricingService {
    pub fn new(store: Arc<dyn CampaignStore>) -> Self {
        Self { store }
    }

    /// Resolve the effective price of one product
    pub async fn price_product(&self, product: &PricedProduct) -> PricingResult<PriceResolution> {
        self.price_product_at(product, Utc::now()).await
    }

    pub async fn price_product_at(
        &self,
        product: &PricedProduct,
        now: DateTime<Utc>,
    ) -> PricingResult<PriceResolution> {
        let campaigns = self.store.applicable_campaigns(product, now).await?;
        Ok(resolve_price(product, &campaigns, now))
    }

    /// Resolve many products with one campaign read
    ///
    /// # Returns
    /// Map keyed by product id; an empty input never touches the store
    pub async fn price_products(
        &self,
        products: &[PricedProduct],
    ) -> PricingResult<HashMap<i32, PriceResolution>> {
        self.price_products_at(products, Utc::now()).await
    }

    pub async fn price_products_at(
        &self,
        products: &[PricedProduct],
        now: DateTime<Utc>,
    ) -> PricingResult<HashMap<i32, PriceResolution>> {
        if products.is_empty() {
            return Ok(HashMap::new());
        }

        let campaigns = self.store.automatic_campaigns(now).await?;
        tracing::debug!(
            "Resolving {} products against {} live campaigns",
            products.len(),
            campaigns.len()
        );

        Ok(resolve_batch(products, &campaigns, now))
    }

    /// Quote a PACKAGE campaign
    pub async fn quote_package(&self, campaign_id: i32) -> PricingResult<PackageQuote> {
        self.quote_package_at(campaign_id, Utc::now()).await
    }

    pub async fn quote_package_at(
        &self,
        campaign_id: i32,
        now: DateTime<Utc>,
    ) -> PricingResult<PackageQuote> {
        let campaign = self
            .store
            .find_campaign(campaign_id)
            .await?
            .ok_or(PricingError::CampaignNotFound(campaign_id))?;

        let items = match &campaign.scope {
            CampaignScope::Package { product_ids, .. } => self.store.package_items(product_ids).await?,
            _ => Vec::new(),
        };

        quote_package(&campaign, &items, now)
    }
}
