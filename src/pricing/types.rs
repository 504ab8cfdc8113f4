// Domain types for campaign pricing
// Campaigns are loaded as flat rows and normalized into a tagged scope union

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;

use crate::pricing::error::PricingError;

/// Campaign type as stored in `campaigns.campaign_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignType {
    /// Applies to every product
    General,
    /// Applies to products in the linked categories
    Category,
    /// Applies to the linked products only
    Product,
    /// Sells the linked products together at a fixed total price
    Package,
}

impl CampaignType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignType::General => "GENERAL",
            CampaignType::Category => "CATEGORY",
            CampaignType::Product => "PRODUCT",
            CampaignType::Package => "PACKAGE",
        }
    }
}

impl fmt::Display for CampaignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CampaignType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GENERAL" => Ok(CampaignType::General),
            "CATEGORY" => Ok(CampaignType::Category),
            "PRODUCT" => Ok(CampaignType::Product),
            "PACKAGE" => Ok(CampaignType::Package),
            _ => Err(format!("Invalid campaign type: {}", s)),
        }
    }
}

/// Per-product discount rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discount {
    /// Percentage of the current price (10 = 10% off)
    Percent(Decimal),
    /// Fixed amount subtracted from the current price
    Amount(Decimal),
}

impl Discount {
    /// Build a discount from the two nullable columns.
    /// Percent wins when both are present.
    pub fn from_columns(percent: Option<Decimal>, amount: Option<Decimal>) -> Option<Self> {
        match (percent, amount) {
            (Some(p), _) => Some(Discount::Percent(p)),
            (None, Some(a)) => Some(Discount::Amount(a)),
            (None, None) => None,
        }
    }

    pub fn percent(&self) -> Option<Decimal> {
        match self {
            Discount::Percent(p) => Some(*p),
            Discount::Amount(_) => None,
        }
    }

    pub fn amount(&self) -> Option<Decimal> {
        match self {
            Discount::Percent(_) => None,
            Discount::Amount(a) => Some(*a),
        }
    }
}

/// What a campaign targets, and how it prices what it targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampaignScope {
    General {
        discount: Option<Discount>,
    },
    Category {
        discount: Option<Discount>,
        category_ids: Vec<i32>,
    },
    Product {
        discount: Option<Discount>,
        product_ids: Vec<i32>,
    },
    Package {
        package_price: Decimal,
        product_ids: Vec<i32>,
    },
}

/// A promotional campaign
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Campaign {
    pub id: i32,
    pub title: String,
    pub is_active: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub campaign_code: Option<String>,
    pub scope: CampaignScope,
}

impl CampaignScope {
    pub fn campaign_type(&self) -> CampaignType {
        match self {
            CampaignScope::General { .. } => CampaignType::General,
            CampaignScope::Category { .. } => CampaignType::Category,
            CampaignScope::Product { .. } => CampaignType::Product,
            CampaignScope::Package { .. } => CampaignType::Package,
        }
    }

    /// Per-product discount; packages never carry one
    pub fn discount(&self) -> Option<Discount> {
        match self {
            CampaignScope::General { discount }
            | CampaignScope::Category { discount, .. }
            | CampaignScope::Product { discount, .. } => *discount,
            CampaignScope::Package { .. } => None,
        }
    }
}

impl Campaign {
    pub fn campaign_type(&self) -> CampaignType {
        self.scope.campaign_type()
    }

    pub fn discount(&self) -> Option<Discount> {
        self.scope.discount()
    }

    /// Active flag set and `now` inside `[start_date, end_date]`
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.start_date <= now && now <= self.end_date
    }

    /// Eligible for automatic price computation: live, no code, not a package
    pub fn is_automatic(&self, now: DateTime<Utc>) -> bool {
        self.is_live(now)
            && self.campaign_code.is_none()
            && self.campaign_type() != CampaignType::Package
    }

    /// Whether the campaign's scope covers the product
    pub fn applies_to(&self, product: &PricedProduct) -> bool {
        match &self.scope {
            CampaignScope::General { .. } => true,
            CampaignScope::Category { category_ids, .. } => product
                .category_id
                .map_or(false, |category_id| category_ids.contains(&category_id)),
            CampaignScope::Product { product_ids, .. } => product_ids.contains(&product.id),
            CampaignScope::Package { .. } => false,
        }
    }
}

/// Flat campaign row, with link tables aggregated into arrays
#[derive(Debug, Clone, FromRow)]
pub struct CampaignRow {
    pub id: i32,
    pub title: String,
    pub campaign_type: String,
    pub is_active: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub discount_percent: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    pub package_price: Option<Decimal>,
    pub campaign_code: Option<String>,
    pub category_ids: Vec<i32>,
    pub product_ids: Vec<i32>,
}

impl TryFrom<CampaignRow> for Campaign {
    type Error = PricingError;

    fn try_from(row: CampaignRow) -> Result<Self, Self::Error> {
        let campaign_type: CampaignType = row
            .campaign_type
            .parse()
            .map_err(|e: String| PricingError::InvalidCampaign(format!("campaign {}: {}", row.id, e)))?;

        let discount = Discount::from_columns(row.discount_percent, row.discount_amount);

        let scope = match campaign_type {
            CampaignType::General => CampaignScope::General { discount },
            CampaignType::Category => CampaignScope::Category {
                discount,
                category_ids: row.category_ids,
            },
            CampaignType::Product => CampaignScope::Product {
                discount,
                product_ids: row.product_ids,
            },
            CampaignType::Package => CampaignScope::Package {
                package_price: row.package_price.ok_or_else(|| {
                    PricingError::InvalidCampaign(format!(
                        "package campaign {} has no package_price",
                        row.id
                    ))
                })?,
                product_ids: row.product_ids,
            },
        };

        Ok(Campaign {
            id: row.id,
            title: row.title,
            is_active: row.is_active,
            start_date: row.start_date,
            end_date: row.end_date,
            campaign_code: row.campaign_code,
            scope,
        })
    }
}

/// Product fields the resolver reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedProduct {
    pub id: i32,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub category_id: Option<i32>,
}

/// Effective selling price of a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PriceResolution {
    /// Price actually charged
    #[schema(value_type = String, example = "90.00")]
    pub final_price: Decimal,
    /// Last pre-discount price shown struck through, if any discount applied
    #[schema(value_type = Option<String>, example = "100.00")]
    pub original_price: Option<Decimal>,
    pub has_campaign: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub campaign_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub campaign_title: Option<String>,
    /// Amount subtracted by the campaign
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[schema(value_type = Option<String>, example = "10.00")]
    pub campaign_discount: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    fn row(campaign_type: &str) -> CampaignRow {
        let now = Utc::now();
        CampaignRow {
            id: 7,
            title: "Yaz İndirimi".to_string(),
            campaign_type: campaign_type.to_string(),
            is_active: true,
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(1),
            discount_percent: None,
            discount_amount: None,
            package_price: None,
            campaign_code: None,
            category_ids: vec![],
            product_ids: vec![],
        }
    }

    fn product(id: i32, category_id: Option<i32>) -> PricedProduct {
        PricedProduct {
            id,
            price: dec!(100),
            sale_price: None,
            category_id,
        }
    }

    #[test]
    fn test_campaign_type_round_trips_through_str() {
        for t in [
            CampaignType::General,
            CampaignType::Category,
            CampaignType::Product,
            CampaignType::Package,
        ] {
            assert_eq!(CampaignType::from_str(t.as_str()).unwrap(), t);
        }
        assert!(CampaignType::from_str("general").is_err());
    }

    #[test]
    fn test_percent_wins_over_amount() {
        assert_eq!(
            Discount::from_columns(Some(dec!(10)), Some(dec!(50))),
            Some(Discount::Percent(dec!(10)))
        );
        assert_eq!(
            Discount::from_columns(None, Some(dec!(50))),
            Some(Discount::Amount(dec!(50)))
        );
        assert_eq!(Discount::from_columns(None, None), None);
    }

    #[test]
    fn test_row_conversion_builds_scope() {
        let mut category_row = row("CATEGORY");
        category_row.discount_percent = Some(dec!(20));
        category_row.category_ids = vec![3, 4];

        let campaign = Campaign::try_from(category_row).unwrap();
        assert_eq!(campaign.campaign_type(), CampaignType::Category);
        assert_eq!(campaign.discount(), Some(Discount::Percent(dec!(20))));
        assert!(campaign.applies_to(&product(1, Some(4))));
        assert!(!campaign.applies_to(&product(1, Some(5))));
        assert!(!campaign.applies_to(&product(1, None)));
    }

    #[test]
    fn test_row_conversion_rejects_unknown_type() {
        let result = Campaign::try_from(row("BOGUS"));
        assert!(matches!(result, Err(PricingError::InvalidCampaign(_))));
    }

    #[test]
    fn test_package_requires_price_and_drops_discount() {
        let mut package_row = row("PACKAGE");
        package_row.discount_percent = Some(dec!(15));
        package_row.product_ids = vec![1, 2];
        assert!(matches!(
            Campaign::try_from(package_row.clone()),
            Err(PricingError::InvalidCampaign(_))
        ));

        package_row.package_price = Some(dec!(250));
        let campaign = Campaign::try_from(package_row).unwrap();
        assert_eq!(campaign.discount(), None);
        assert!(!campaign.applies_to(&product(1, None)));
        assert!(!campaign.is_automatic(Utc::now()));
    }

    #[test]
    fn test_live_window_is_inclusive() {
        let campaign = Campaign::try_from(row("GENERAL")).unwrap();
        assert!(campaign.is_live(campaign.start_date));
        assert!(campaign.is_live(campaign.end_date));
        assert!(!campaign.is_live(campaign.end_date + Duration::seconds(1)));
        assert!(!campaign.is_live(campaign.start_date - Duration::seconds(1)));
    }

    #[test]
    fn test_code_campaign_is_not_automatic() {
        let mut code_row = row("GENERAL");
        code_row.campaign_code = Some("SUMMER10".to_string());
        let campaign = Campaign::try_from(code_row).unwrap();
        let now = Utc::now();
        assert!(campaign.is_live(now));
        assert!(!campaign.is_automatic(now));
    }

    #[test]
    fn test_price_resolution_serialization_omits_empty_campaign_fields() {
        let resolution = PriceResolution {
            final_price: dec!(80),
            original_price: Some(dec!(100)),
            has_campaign: false,
            campaign_id: None,
            campaign_title: None,
            campaign_discount: None,
        };

        let json = serde_json::to_value(&resolution).unwrap();
        assert_eq!(json["final_price"], "80");
        assert_eq!(json["original_price"], "100");
        assert_eq!(json["has_campaign"], false);
        assert!(json.get("campaign_title").is_none());
        assert!(json.get("campaign_discount").is_none());
    }
}
