// JWT token generation and validation service

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::error::AuthError;

pub const ACCESS_TOKEN_SECONDS: i64 = 900;
pub const REFRESH_TOKEN_SECONDS: i64 = 604_800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32, // admin id
    pub email: String,
    pub kind: TokenKind,
    pub exp: i64,
    pub iat: i64,
    /// Unique per token so two tokens minted in the same second differ
    pub jti: String,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// An issued token pair
#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Token service for JWT operations
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_duration: i64,
    refresh_token_duration: i64,
}

impl TokenService {
    /// Access tokens expire in 15 minutes, refresh tokens in 7 days
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_duration: ACCESS_TOKEN_SECONDS,
            refresh_token_duration: REFRESH_TOKEN_SECONDS,
        }
    }

    pub fn access_token_duration(&self) -> i64 {
        self.access_token_duration
    }

    fn generate(&self, admin_id: i32, email: &str, kind: TokenKind) -> Result<(String, Claims), AuthError> {
        let now = Utc::now().timestamp();
        let duration = match kind {
            TokenKind::Access => self.access_token_duration,
            TokenKind::Refresh => self.refresh_token_duration,
        };

        let claims = Claims {
            sub: admin_id,
            email: email.to_string(),
            kind,
            iat: now,
            exp: now + duration,
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGenerationError(e.to_string()))?;

        Ok((token, claims))
    }

    pub fn generate_access_token(&self, admin_id: i32, email: &str) -> Result<String, AuthError> {
        self.generate(admin_id, email, TokenKind::Access).map(|(token, _)| token)
    }

    pub fn generate_refresh_token(&self, admin_id: i32, email: &str) -> Result<String, AuthError> {
        self.generate(admin_id, email, TokenKind::Refresh).map(|(token, _)| token)
    }

    pub fn generate_token_pair(&self, admin_id: i32, email: &str) -> Result<TokenPair, AuthError> {
        let (access_token, _) = self.generate(admin_id, email, TokenKind::Access)?;
        let (refresh_token, refresh_claims) = self.generate(admin_id, email, TokenKind::Refresh)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            refresh_expires_at: refresh_claims.expires_at(),
        })
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_token(token, TokenKind::Access)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_token(token, TokenKind::Refresh)
    }

    fn validate_token(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            })?;

        if claims.kind != expected {
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}
