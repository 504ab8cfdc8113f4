// Error types for campaign pricing

use thiserror::Error;

/// Errors raised while resolving prices or quoting packages
#[derive(Debug, Error)]
pub enum PricingError {
    /// Campaign store failure; never swallowed into a default price
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored campaign row cannot be represented
    #[error("Invalid campaign data: {0}")]
    InvalidCampaign(String),

    #[error("Campaign not found: {0}")]
    CampaignNotFound(i32),

    #[error("Campaign {0} is not a package campaign")]
    NotAPackage(i32),

    #[error("Package campaign {0} is not currently active")]
    PackageInactive(i32),

    /// A product linked to a package is missing or inactive
    #[error("Product {product_id} in package {campaign_id} is unavailable")]
    PackageProductUnavailable { campaign_id: i32, product_id: i32 },
}

pub type PricingResult<T> = Result<T, PricingError>;
