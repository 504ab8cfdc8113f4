use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use crate::campaigns::error::CampaignError;
use crate::campaigns::models::NewCampaign;
use crate::pricing::store::{into_campaigns, CAMPAIGN_SELECT};
use crate::pricing::{Campaign, CampaignRow, CampaignScope};

/// Flat column values for a scope
struct ScopeColumns<'a> {
    campaign_type: &'static str,
    discount_percent: Option<Decimal>,
    discount_amount: Option<Decimal>,
    package_price: Option<Decimal>,
    category_ids: &'a [i32],
    product_ids: &'a [i32],
}

impl<'a> ScopeColumns<'a> {
    fn from_scope(scope: &'a CampaignScope) -> Self {
        let category_ids: &[i32] = match scope {
            CampaignScope::Category { category_ids, .. } => category_ids.as_slice(),
            _ => &[],
        };

        let product_ids: &[i32] = match scope {
            CampaignScope::Product { product_ids, .. }
            | CampaignScope::Package { product_ids, .. } => product_ids.as_slice(),
            _ => &[],
        };

        let package_price = match scope {
            CampaignScope::Package { package_price, .. } => Some(*package_price),
            _ => None,
        };

        let discount = scope.discount();

        Self {
            campaign_type: scope.campaign_type().as_str(),
            discount_percent: discount.and_then(|d| d.percent()),
            discount_amount: discount.and_then(|d| d.amount()),
            package_price,
            category_ids,
            product_ids,
        }
    }
}

/// Repository for campaign administration
#[derive(Clone)]
pub struct CampaignRepository {
    pool: PgPool,
}

impl CampaignRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All campaigns, newest first
    pub async fn list(&self) -> Result<Vec<Campaign>, CampaignError> {
        let sql = format!("{} ORDER BY c.created_at DESC, c.id DESC", CAMPAIGN_SELECT);
        let rows = sqlx::query_as::<_, CampaignRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(into_campaigns(rows)?)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Campaign>, CampaignError> {
        let sql = format!("{} WHERE c.id = $1", CAMPAIGN_SELECT);
        let row = sqlx::query_as::<_, CampaignRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Campaign::try_from).transpose()?)
    }

    /// Live campaign carrying `code`, compared case-insensitively
    pub async fn find_live_by_code(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Campaign>, CampaignError> {
        let sql = format!(
            r#"{}
            WHERE UPPER(c.campaign_code) = UPPER($1)
              AND c.is_active = TRUE
              AND c.start_date <= $2
              AND c.end_date >= $2"#,
            CAMPAIGN_SELECT
        );
        let row = sqlx::query_as::<_, CampaignRow>(&sql)
            .bind(code.trim())
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Campaign::try_from).transpose()?)
    }

    /// Insert a campaign and its links in one transaction
    pub async fn create(&self, campaign: &NewCampaign) -> Result<Campaign, CampaignError> {
        let columns = ScopeColumns::from_scope(&campaign.scope);
        let mut tx = self.pool.begin().await?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO campaigns (title, campaign_type, is_active, start_date, end_date,
                                   discount_percent, discount_amount, package_price, campaign_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&campaign.title)
        .bind(columns.campaign_type)
        .bind(campaign.is_active)
        .bind(campaign.start_date)
        .bind(campaign.end_date)
        .bind(columns.discount_percent)
        .bind(columns.discount_amount)
        .bind(columns.package_price)
        .bind(&campaign.campaign_code)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_code_conflict(e, campaign))?;

        write_links(&mut tx, id, &columns).await?;
        tx.commit().await?;

        Ok(built(id, campaign))
    }

    /// Replace every field and link of an existing campaign
    ///
    /// # Returns
    /// None when no campaign has this id
    pub async fn update(
        &self,
        id: i32,
        campaign: &NewCampaign,
    ) -> Result<Option<Campaign>, CampaignError> {
        let columns = ScopeColumns::from_scope(&campaign.scope);
        let mut tx = self.pool.begin().await?;

        let updated: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE campaigns
            SET title = $2, campaign_type = $3, is_active = $4, start_date = $5, end_date = $6,
                discount_percent = $7, discount_amount = $8, package_price = $9,
                campaign_code = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&campaign.title)
        .bind(columns.campaign_type)
        .bind(campaign.is_active)
        .bind(campaign.start_date)
        .bind(campaign.end_date)
        .bind(columns.discount_percent)
        .bind(columns.discount_amount)
        .bind(columns.package_price)
        .bind(&campaign.campaign_code)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_code_conflict(e, campaign))?;

        if updated.is_none() {
            return Ok(None);
        }

        sqlx::query("DELETE FROM campaign_categories WHERE campaign_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM campaign_products WHERE campaign_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        write_links(&mut tx, id, &columns).await?;
        tx.commit().await?;

        Ok(Some(built(id, campaign)))
    }

    /// Links cascade with the campaign row
    pub async fn delete(&self, id: i32) -> Result<bool, CampaignError> {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

async fn write_links(
    tx: &mut Transaction<'_, Postgres>,
    campaign_id: i32,
    columns: &ScopeColumns<'_>,
) -> Result<(), CampaignError> {
    if !columns.category_ids.is_empty() {
        sqlx::query(
            "INSERT INTO campaign_categories (campaign_id, category_id) SELECT $1, UNNEST($2::int[])",
        )
        .bind(campaign_id)
        .bind(columns.category_ids)
        .execute(&mut **tx)
        .await?;
    }

    if !columns.product_ids.is_empty() {
        sqlx::query(
            "INSERT INTO campaign_products (campaign_id, product_id) SELECT $1, UNNEST($2::int[])",
        )
        .bind(campaign_id)
        .bind(columns.product_ids)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

fn map_code_conflict(err: sqlx::Error, campaign: &NewCampaign) -> CampaignError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return CampaignError::DuplicateCode(campaign.campaign_code.clone().unwrap_or_default());
        }
    }
    CampaignError::from(err)
}

fn built(id: i32, campaign: &NewCampaign) -> Campaign {
    Campaign {
        id,
        title: campaign.title.clone(),
        is_active: campaign.is_active,
        start_date: campaign.start_date,
        end_date: campaign.end_date,
        campaign_code: campaign.campaign_code.clone(),
        scope: campaign.scope.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::Discount;
    use rust_decimal_macros::dec;

    #[test]
    fn test_scope_columns_for_category() {
        let scope = CampaignScope::Category {
            discount: Some(Discount::Amount(dec!(20))),
            category_ids: vec![1, 2],
        };
        let columns = ScopeColumns::from_scope(&scope);

        assert_eq!(columns.campaign_type, "CATEGORY");
        assert_eq!(columns.discount_percent, None);
        assert_eq!(columns.discount_amount, Some(dec!(20)));
        assert_eq!(columns.category_ids, &[1, 2]);
        assert!(columns.product_ids.is_empty());
    }

    #[test]
    fn test_scope_columns_for_package() {
        let scope = CampaignScope::Package {
            package_price: dec!(150),
            product_ids: vec![3, 4],
        };
        let columns = ScopeColumns::from_scope(&scope);

        assert_eq!(columns.campaign_type, "PACKAGE");
        assert_eq!(columns.package_price, Some(dec!(150)));
        assert_eq!(columns.discount_percent, None);
        assert_eq!(columns.product_ids, &[3, 4]);
    }
}
