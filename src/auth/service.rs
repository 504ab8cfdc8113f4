// Authentication service - business logic layer

use std::sync::Arc;

use tracing::{debug, info};

use crate::auth::{
    error::AuthError,
    models::{AdminAccount, AdminResponse, AuthResponse},
    password::PasswordService,
    repository::{AdminRepository, TokenRepository},
    token::TokenService,
};

/// Admin authentication service
#[derive(Clone)]
pub struct AuthService {
    admins: AdminRepository,
    tokens: TokenRepository,
    token_service: Arc<TokenService>,
}

impl AuthService {
    pub fn new(admins: AdminRepository, tokens: TokenRepository, token_service: Arc<TokenService>) -> Self {
        Self {
            admins,
            tokens,
            token_service,
        }
    }

    /// Check credentials and issue a fresh token pair
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let admin = self
            .admins
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !PasswordService::verify_password(password, &admin.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        info!(admin_id = admin.id, "Admin logged in");
        self.issue_tokens(admin).await
    }

    /// Exchange a refresh token for a new pair; the old token stops working
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<AuthResponse, AuthError> {
        let claims = self.token_service.validate_refresh_token(refresh_token)?;

        let admin_id = self
            .tokens
            .consume_refresh_token(refresh_token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if admin_id != claims.sub {
            return Err(AuthError::InvalidToken);
        }

        let admin = self
            .admins
            .find_by_id(admin_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        debug!(admin_id, "Rotated refresh token");
        self.issue_tokens(admin).await
    }

    pub async fn current_admin(&self, admin_id: i32) -> Result<AdminResponse, AuthError> {
        self.admins
            .find_by_id(admin_id)
            .await?
            .map(AdminResponse::from)
            .ok_or(AuthError::InvalidToken)
    }

    /// Create the admin account if the email is not taken yet
    ///
    /// Returns true when a new account was created. An existing account keeps its password.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        if self.admins.find_by_email(email).await?.is_some() {
            return Ok(false);
        }

        PasswordService::validate_password_strength(password)?;
        let password_hash = PasswordService::hash_password(password)?;
        let admin = self.admins.create_admin(&email.to_lowercase(), &password_hash).await?;

        info!(admin_id = admin.id, email = %admin.email, "Created bootstrap admin");
        Ok(true)
    }

    /// Drop refresh tokens past their expiry
    pub async fn purge_expired_tokens(&self) -> Result<u64, AuthError> {
        self.tokens.delete_expired_tokens().await
    }

    async fn issue_tokens(&self, admin: AdminAccount) -> Result<AuthResponse, AuthError> {
        let pair = self.token_service.generate_token_pair(admin.id, &admin.email)?;
        self.tokens
            .store_refresh_token(admin.id, &pair.refresh_token, pair.refresh_expires_at)
            .await?;

        Ok(AuthResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.token_service.access_token_duration(),
            admin: AdminResponse::from(admin),
        })
    }
}
