// Database repositories for admin accounts and refresh tokens

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use crate::auth::{error::AuthError, models::AdminAccount};

/// Admin account repository
#[derive(Clone)]
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_admin(&self, email: &str, password_hash: &str) -> Result<AdminAccount, AuthError> {
        let admin = sqlx::query_as::<_, AdminAccount>(
            "INSERT INTO admin_users (email, password_hash) VALUES ($1, $2) \
             RETURNING id, email, password_hash, created_at",
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(admin)
    }

    /// Find an admin by email (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<AdminAccount>, AuthError> {
        let admin = sqlx::query_as::<_, AdminAccount>(
            "SELECT id, email, password_hash, created_at FROM admin_users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<AdminAccount>, AuthError> {
        let admin = sqlx::query_as::<_, AdminAccount>(
            "SELECT id, email, password_hash, created_at FROM admin_users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }
}

/// Refresh token repository; only SHA-256 digests are stored
#[derive(Clone)]
pub struct TokenRepository {
    pool: PgPool,
}

impl TokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lowercase hex SHA-256 digest
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub async fn store_refresh_token(
        &self,
        admin_id: i32,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        sqlx::query(
            "INSERT INTO admin_refresh_tokens (admin_id, token_hash, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(admin_id)
        .bind(Self::hash_token(token))
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete an unexpired refresh token and return its admin id
    ///
    /// A token can be consumed once; a second call with the same token gets None.
    pub async fn consume_refresh_token(&self, token: &str) -> Result<Option<i32>, AuthError> {
        let admin_id = sqlx::query_scalar::<_, i32>(
            "DELETE FROM admin_refresh_tokens WHERE token_hash = $1 AND expires_at > NOW() \
             RETURNING admin_id",
        )
        .bind(Self::hash_token(token))
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin_id)
    }

    pub async fn delete_expired_tokens(&self) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM admin_refresh_tokens WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
