pub mod error;
pub mod package;
pub mod resolver;
pub mod service;
pub mod store;
pub mod types;

pub use error::*;
pub use package::*;
pub use resolver::*;
pub use service::*;
pub use store::{CampaignStore, PgCampaignStore};
pub use types::*;
