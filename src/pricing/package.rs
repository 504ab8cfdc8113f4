// Package campaign quoting
// A package sells its linked products together at one fixed price

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::pricing::error::{PricingError, PricingResult};
use crate::pricing::types::{Campaign, CampaignScope};

/// Product row as seen by a package quote
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PackageItem {
    pub id: i32,
    pub title: String,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub is_active: bool,
}

impl PackageItem {
    /// Pre-campaign price
    pub fn unit_price(&self) -> Decimal {
        self.sale_price.unwrap_or(self.price)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PackageQuoteItem {
    pub product_id: i32,
    pub title: String,
    #[schema(value_type = String, example = "149.90")]
    pub unit_price: Decimal,
}

/// Bundle price compared against buying the products one by one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PackageQuote {
    pub campaign_id: i32,
    pub title: String,
    #[schema(value_type = String, example = "250.00")]
    pub package_price: Decimal,
    #[schema(value_type = String, example = "299.80")]
    pub items_total: Decimal,
    #[schema(value_type = String, example = "49.80")]
    pub savings: Decimal,
    pub products: Vec<PackageQuoteItem>,
}

/// Quote a package campaign against its linked products
///
/// `items` may come back from the store in any order and may be missing
/// rows; the quote follows the campaign's product list.
pub fn quote_package(
    campaign: &Campaign,
    items: &[PackageItem],
    now: DateTime<Utc>,
) -> PricingResult<PackageQuote> {
    let (package_price, product_ids) = match &campaign.scope {
        CampaignScope::Package {
            package_price,
            product_ids,
        } => (*package_price, product_ids),
        _ => return Err(PricingError::NotAPackage(campaign.id)),
    };

    if !campaign.is_live(now) {
        return Err(PricingError::PackageInactive(campaign.id));
    }

    let mut products = Vec::with_capacity(product_ids.len());
    for product_id in product_ids {
        let item = items
            .iter()
            .find(|item| item.id == *product_id && item.is_active)
            .ok_or(PricingError::PackageProductUnavailable {
                campaign_id: campaign.id,
                product_id: *product_id,
            })?;

        products.push(PackageQuoteItem {
            product_id: item.id,
            title: item.title.clone(),
            unit_price: item.unit_price(),
        });
    }

    let items_total: Decimal = products.iter().map(|p| p.unit_price).sum();
    let savings = (items_total - package_price).max(Decimal::ZERO);

    Ok(PackageQuote {
        campaign_id: campaign.id,
        title: campaign.title.clone(),
        package_price,
        items_total,
        savings,
        products,
    })
}
