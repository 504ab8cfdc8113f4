// Error types for campaign administration

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pricing::PricingError;

#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Campaign not found: {0}")]
    NotFound(i32),

    #[error("No active campaign with code {0}")]
    CodeNotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Campaign code {0} is already in use")]
    DuplicateCode(String),

    /// A linked category or product id does not exist
    #[error("Unknown reference: {0}")]
    UnknownReference(String),

    #[error("Invalid campaign data: {0}")]
    InvalidData(String),
}

impl From<sqlx::Error> for CampaignError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_foreign_key_violation() {
                return CampaignError::UnknownReference(
                    "category or product does not exist".to_string(),
                );
            }
        }
        CampaignError::Database(err)
    }
}

impl From<validator::ValidationErrors> for CampaignError {
    fn from(err: validator::ValidationErrors) -> Self {
        CampaignError::Validation(err.to_string())
    }
}

impl From<PricingError> for CampaignError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::Database(e) => CampaignError::Database(e),
            PricingError::CampaignNotFound(id) => CampaignError::NotFound(id),
            other => CampaignError::InvalidData(other.to_string()),
        }
    }
}

impl IntoResponse for CampaignError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            CampaignError::Database(e) => {
                tracing::error!("Database error in campaigns: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
            }
            CampaignError::InvalidData(msg) => {
                tracing::error!("Invalid campaign data: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Invalid campaign data")
            }
            CampaignError::NotFound(_) | CampaignError::CodeNotFound(_) => {
                (StatusCode::NOT_FOUND, "Campaign not found")
            }
            CampaignError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation error"),
            CampaignError::UnknownReference(_) => (StatusCode::BAD_REQUEST, "Unknown reference"),
            CampaignError::DuplicateCode(code) => {
                tracing::warn!("Rejected duplicate campaign code {}", code);
                (StatusCode::CONFLICT, "Duplicate campaign code")
            }
        };

        let details = match &self {
            CampaignError::Database(_) | CampaignError::InvalidData(_) => None,
            _ => Some(self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
            "details": details,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            CampaignError::NotFound(1).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CampaignError::CodeNotFound("YAZ".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CampaignError::Validation("bad".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CampaignError::DuplicateCode("YAZ".into()).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            CampaignError::from(sqlx::Error::PoolTimedOut).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_pricing_error() {
        assert!(matches!(
            CampaignError::from(PricingError::CampaignNotFound(4)),
            CampaignError::NotFound(4)
        ));
        assert!(matches!(
            CampaignError::from(PricingError::InvalidCampaign("x".into())),
            CampaignError::InvalidData(_)
        ));
    }
}
