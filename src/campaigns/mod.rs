// Campaign administration: CRUD behind admin auth plus public code lookup

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

pub use error::CampaignError;
pub use handlers::*;
pub use models::{CampaignRequest, CampaignResponse, NewCampaign};
pub use repository::CampaignRepository;
