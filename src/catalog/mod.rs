pub mod handlers;
pub mod models;
pub mod query;
pub mod repository;

pub use handlers::*;
pub use models::*;
pub use query::{ProductQuery, QueryValidator, ValidatedQuery};
pub use repository::*;
