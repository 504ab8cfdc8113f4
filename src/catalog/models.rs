use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::Validate;

use crate::pricing::{PriceResolution, PricedProduct};

/// Most product ids accepted by one quote request
pub const MAX_QUOTE_IDS: u64 = 200;

/// A sticker product in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    #[schema(example = 12)]
    pub id: i32,
    #[schema(example = "Kapı Yan Şerit Sticker")]
    pub title: String,
    #[schema(example = "kapi-yan-serit-sticker")]
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// List price
    #[schema(value_type = String, example = "249.90")]
    pub price: Decimal,
    /// Store-wide markdown, never above `price`
    #[schema(value_type = Option<String>, example = "199.90")]
    pub sale_price: Option<Decimal>,
    pub category_id: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Product> for PricedProduct {
    fn from(product: &Product) -> Self {
        PricedProduct {
            id: product.id,
            price: product.price,
            sale_price: product.sale_price,
            category_id: product.category_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = "Kaput Sticker")]
    pub name: String,
    #[schema(example = "kaput-sticker")]
    pub slug: String,
}

/// Product as shown in the storefront, with its resolved price
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = Option<String>)]
    pub sale_price: Option<Decimal>,
    pub category_id: Option<i32>,
    pub pricing: PriceResolution,
}

impl ProductResponse {
    pub fn new(product: Product, pricing: PriceResolution) -> Self {
        Self {
            id: product.id,
            title: product.title,
            slug: product.slug,
            description: product.description,
            image_url: product.image_url,
            price: product.price,
            sale_price: product.sale_price,
            category_id: product.category_id,
            pricing,
        }
    }
}

/// One page of the product listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductPage {
    pub items: Vec<ProductResponse>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub limit: u32,
    /// Matching products across all pages
    #[schema(example = 57)]
    pub total: i64,
}

/// Body of `POST /api/pricing/quote`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct QuoteRequest {
    #[validate(length(min = 1, max = "MAX_QUOTE_IDS"))]
    #[schema(example = json!([1, 2, 3]))]
    pub product_ids: Vec<i32>,
}

/// Resolved prices keyed by product id
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PriceQuote(pub BTreeMap<i32, PriceResolution>);

impl QuoteRequest {
    /// Ids in request order with duplicates removed
    pub fn unique_ids(&self) -> Vec<i32> {
        let mut seen = std::collections::HashSet::new();
        self.product_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect()
    }
}
