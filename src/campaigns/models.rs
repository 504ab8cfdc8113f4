// Campaign admin DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::campaigns::error::CampaignError;
use crate::pricing::{Campaign, CampaignScope, CampaignType, Discount};
use crate::validation::{
    normalize_campaign_code, validate_campaign_code, validate_discount_percent,
    validate_positive_amount,
};

fn default_true() -> bool {
    true
}

/// Body of campaign create and full-replace requests
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CampaignRequest {
    #[validate(length(min = 1, max = 200))]
    #[schema(example = "Yaz İndirimi")]
    pub title: String,
    pub campaign_type: CampaignType,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[schema(value_type = Option<String>, example = "15")]
    pub discount_percent: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub discount_amount: Option<Decimal>,
    /// PACKAGE only
    #[schema(value_type = Option<String>)]
    pub package_price: Option<Decimal>,
    /// Manual-entry code; campaigns with a code never apply automatically
    #[validate(custom = "validate_campaign_code")]
    #[schema(example = "YAZ15")]
    pub campaign_code: Option<String>,
    /// CATEGORY only
    #[serde(default)]
    pub category_ids: Vec<i32>,
    /// PRODUCT and PACKAGE only
    #[serde(default)]
    pub product_ids: Vec<i32>,
}

/// Validated campaign ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCampaign {
    pub title: String,
    pub is_active: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub campaign_code: Option<String>,
    pub scope: CampaignScope,
}

fn invalid(message: &str) -> CampaignError {
    CampaignError::Validation(message.to_string())
}

/// Sorted, duplicate-free ids
fn normalize_ids(mut ids: Vec<i32>) -> Vec<i32> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

impl CampaignRequest {
    /// Field validation plus the cross-field rules for each campaign type
    pub fn into_new_campaign(self) -> Result<NewCampaign, CampaignError> {
        self.validate()?;

        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(invalid("title must not be blank"));
        }

        if self.end_date < self.start_date {
            return Err(invalid("end_date must not be before start_date"));
        }

        if let Some(percent) = self.discount_percent {
            validate_discount_percent(percent)
                .map_err(|_| {
                    invalid("discount_percent must be greater than 0 and at most 100 with at most 2 decimal places")
                })?;
        }
        if let Some(amount) = self.discount_amount {
            validate_positive_amount(amount)
                .map_err(|_| invalid("discount_amount must be a positive amount with at most 2 decimal places"))?;
        }
        if self.discount_percent.is_some() && self.discount_amount.is_some() {
            return Err(invalid("set either discount_percent or discount_amount, not both"));
        }

        // Stored as NUMERIC(_, 2); keep the echoed value identical to the stored one
        let discount = Discount::from_columns(
            self.discount_percent.map(|p| p.round_dp(2)),
            self.discount_amount.map(|a| a.round_dp(2)),
        );
        let category_ids = normalize_ids(self.category_ids);
        let product_ids = normalize_ids(self.product_ids);

        if self.campaign_type != CampaignType::Package && self.package_price.is_some() {
            return Err(invalid("package_price is only allowed on PACKAGE campaigns"));
        }
        if self.campaign_type != CampaignType::Category && !category_ids.is_empty() {
            return Err(invalid("category_ids are only allowed on CATEGORY campaigns"));
        }

        let scope = match self.campaign_type {
            CampaignType::General => {
                if !product_ids.is_empty() {
                    return Err(invalid("product_ids are not allowed on GENERAL campaigns"));
                }
                CampaignScope::General {
                    discount: Some(discount.ok_or_else(|| invalid("a discount is required"))?),
                }
            }
            CampaignType::Category => {
                if category_ids.is_empty() {
                    return Err(invalid("CATEGORY campaigns need at least one category"));
                }
                if !product_ids.is_empty() {
                    return Err(invalid("product_ids are not allowed on CATEGORY campaigns"));
                }
                CampaignScope::Category {
                    discount: Some(discount.ok_or_else(|| invalid("a discount is required"))?),
                    category_ids,
                }
            }
            CampaignType::Product => {
                if product_ids.is_empty() {
                    return Err(invalid("PRODUCT campaigns need at least one product"));
                }
                CampaignScope::Product {
                    discount: Some(discount.ok_or_else(|| invalid("a discount is required"))?),
                    product_ids,
                }
            }
            CampaignType::Package => {
                if discount.is_some() {
                    return Err(invalid("PACKAGE campaigns cannot carry a discount"));
                }
                let package_price = self
                    .package_price
                    .ok_or_else(|| invalid("PACKAGE campaigns need a package_price"))?;
                validate_positive_amount(package_price)
                    .map_err(|_| invalid("package_price must be a positive amount with at most 2 decimal places"))?;
                if product_ids.len() < 2 {
                    return Err(invalid("PACKAGE campaigns need at least two products"));
                }
                CampaignScope::Package {
                    package_price: package_price.round_dp(2),
                    product_ids,
                }
            }
        };

        Ok(NewCampaign {
            title,
            is_active: self.is_active,
            start_date: self.start_date,
            end_date: self.end_date,
            campaign_code: self.campaign_code.as_deref().map(normalize_campaign_code),
            scope,
        })
    }
}

/// Campaign as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CampaignResponse {
    pub id: i32,
    pub title: String,
    pub campaign_type: CampaignType,
    pub is_active: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[schema(value_type = Option<String>)]
    pub discount_percent: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub discount_amount: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub package_price: Option<Decimal>,
    pub campaign_code: Option<String>,
    pub category_ids: Vec<i32>,
    pub product_ids: Vec<i32>,
}

impl From<Campaign> for CampaignResponse {
    fn from(campaign: Campaign) -> Self {
        let campaign_type = campaign.campaign_type();
        let discount = campaign.discount();

        let (package_price, category_ids, product_ids) = match campaign.scope {
            CampaignScope::General { .. } => (None, Vec::new(), Vec::new()),
            CampaignScope::Category { category_ids, .. } => (None, category_ids, Vec::new()),
            CampaignScope::Product { product_ids, .. } => (None, Vec::new(), product_ids),
            CampaignScope::Package {
                package_price,
                product_ids,
            } => (Some(package_price), Vec::new(), product_ids),
        };

        Self {
            id: campaign.id,
            title: campaign.title,
            campaign_type,
            is_active: campaign.is_active,
            start_date: campaign.start_date,
            end_date: campaign.end_date,
            discount_percent: discount.and_then(|d| d.percent()),
            discount_amount: discount.and_then(|d| d.amount()),
            package_price,
            campaign_code: campaign.campaign_code,
            category_ids,
            product_ids,
        }
    }
}
