// HTTP handlers for admin authentication endpoints

use axum::{extract::State, Json};
use validator::Validate;

use crate::auth::{
    error::AuthError,
    middleware::AdminUser,
    models::{AdminResponse, AuthResponse, LoginRequest, RefreshRequest},
};
use crate::AppState;

/// Log in an admin
/// POST /api/admin/auth/login
#[utoipa::path(
    post,
    path = "/api/admin/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair issued", body = AuthResponse),
        (status = 400, description = "Malformed request"),
        (status = 401, description = "Invalid email or password")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    request.validate()?;

    let response = state.auth.login(&request.email, &request.password).await?;
    Ok(Json(response))
}

/// Rotate a refresh token
/// POST /api/admin/auth/refresh
#[utoipa::path(
    post,
    path = "/api/admin/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair issued", body = AuthResponse),
        (status = 401, description = "Refresh token invalid, expired or already used")
    ),
    tag = "auth"
)]
pub async fn refresh_handler(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    request.validate()?;

    let response = state.auth.refresh_tokens(&request.refresh_token).await?;
    Ok(Json(response))
}

/// Current admin
/// GET /api/admin/auth/me
#[utoipa::path(
    get,
    path = "/api/admin/auth/me",
    responses(
        (status = 200, description = "Authenticated admin", body = AdminResponse),
        (status = 401, description = "Missing or invalid access token")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me_handler(
    State(state): State<AppState>,
    admin: AdminUser,
) -> Result<Json<AdminResponse>, AuthError> {
    let response = state.auth.current_admin(admin.admin_id).await?;
    Ok(Json(response))
}
