// Campaign store used by the pricing service

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::pricing::error::PricingResult;
use crate::pricing::package::PackageItem;
use crate::pricing::types::{Campaign, CampaignRow, PricedProduct};

/// Campaign columns plus link tables folded into id arrays
pub(crate) const CAMPAIGN_SELECT: &str = r#"
    SELECT c.id, c.title, c.campaign_type, c.is_active, c.start_date, c.end_date,
           c.discount_percent, c.discount_amount, c.package_price, c.campaign_code,
           ARRAY(
               SELECT cc.category_id FROM campaign_categories cc
               WHERE cc.campaign_id = c.id ORDER BY cc.category_id
           ) AS category_ids,
           ARRAY(
               SELECT cp.product_id FROM campaign_products cp
               WHERE cp.campaign_id = c.id ORDER BY cp.product_id
           ) AS product_ids
    FROM campaigns c
"#;

/// Same ordering the in-memory resolver applies within a scope tier
const DISCOUNT_ORDER: &str =
    "ORDER BY c.discount_percent DESC NULLS LAST, c.discount_amount DESC NULLS LAST, c.id ASC";

/// Read access to campaign data
///
/// Every call reads fresh data; implementations must not cache across requests.
#[async_trait]
pub trait CampaignStore: Send + Sync {
    /// Automatic campaigns that may apply to one product
    async fn applicable_campaigns(
        &self,
        product: &PricedProduct,
        now: DateTime<Utc>,
    ) -> PricingResult<Vec<Campaign>>;

    /// All automatic GENERAL, CATEGORY and PRODUCT campaigns live at `now`
    async fn automatic_campaigns(&self, now: DateTime<Utc>) -> PricingResult<Vec<Campaign>>;

    async fn find_campaign(&self, id: i32) -> PricingResult<Option<Campaign>>;

    /// Products by id, active or not
    async fn package_items(&self, product_ids: &[i32]) -> PricingResult<Vec<PackageItem>>;
}

/// PostgreSQL campaign store
#[derive(Clone)]
pub struct PgCampaignStore {
    pool: PgPool,
}

impl PgCampaignStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn into_campaigns(rows: Vec<CampaignRow>) -> PricingResult<Vec<Campaign>> {
    rows.into_iter().map(Campaign::try_from).collect()
}

#[async_trait]
impl CampaignStore for PgCampaignStore {
    async fn applicable_campaigns(
        &self,
        product: &PricedProduct,
        now: DateTime<Utc>,
    ) -> PricingResult<Vec<Campaign>> {
        let sql = format!(
            r#"{}
            WHERE c.is_active = TRUE
              AND c.campaign_code IS NULL
              AND c.start_date <= $1
              AND c.end_date >= $1
              AND (
                  c.campaign_type = 'GENERAL'
                  OR (c.campaign_type = 'CATEGORY' AND EXISTS (
                      SELECT 1 FROM campaign_categories cc
                      WHERE cc.campaign_id = c.id AND cc.category_id = $2
                  ))
                  OR (c.campaign_type = 'PRODUCT' AND EXISTS (
                      SELECT 1 FROM campaign_products cp
                      WHERE cp.campaign_id = c.id AND cp.product_id = $3
                  ))
              )
            {}"#,
            CAMPAIGN_SELECT, DISCOUNT_ORDER
        );

        let rows = sqlx::query_as::<_, CampaignRow>(&sql)
            .bind(now)
            .bind(product.category_id)
            .bind(product.id)
            .fetch_all(&self.pool)
            .await?;

        into_campaigns(rows)
    }

    async fn automatic_campaigns(&self, now: DateTime<Utc>) -> PricingResult<Vec<Campaign>> {
        let sql = format!(
            r#"{}
            WHERE c.is_active = TRUE
              AND c.campaign_code IS NULL
              AND c.start_date <= $1
              AND c.end_date >= $1
              AND c.campaign_type IN ('GENERAL', 'CATEGORY', 'PRODUCT')
            {}"#,
            CAMPAIGN_SELECT, DISCOUNT_ORDER
        );

        let rows = sqlx::query_as::<_, CampaignRow>(&sql)
            .bind(now)
            .fetch_all(&self.pool)
            .await?;

        into_campaigns(rows)
    }

    async fn find_campaign(&self, id: i32) -> PricingResult<Option<Campaign>> {
        let sql = format!("{} WHERE c.id = $1", CAMPAIGN_SELECT);

        let row = sqlx::query_as::<_, CampaignRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Campaign::try_from).transpose()
    }

    async fn package_items(&self, product_ids: &[i32]) -> PricingResult<Vec<PackageItem>> {
        let items = sqlx::query_as::<_, PackageItem>(
            "SELECT id, title, price, sale_price, is_active FROM products WHERE id = ANY($1)",
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}
