// Admin authentication module
// JWT access/refresh tokens with rotation, Argon2 password hashes

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

pub use error::AuthError;
pub use handlers::{login_handler, me_handler, refresh_handler};
pub use middleware::AdminUser;
pub use models::{AdminAccount, AdminResponse, AuthResponse, LoginRequest, RefreshRequest};
pub use repository::{AdminRepository, TokenRepository};
pub use service::AuthService;
pub use token::TokenService;
