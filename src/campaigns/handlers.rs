// HTTP handlers for campaign administration and code lookup

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;

use crate::auth::AdminUser;
use crate::campaigns::error::CampaignError;
use crate::campaigns::models::{CampaignRequest, CampaignResponse};
use crate::AppState;

/// GET /api/admin/campaigns
#[utoipa::path(
    get,
    path = "/api/admin/campaigns",
    responses(
        (status = 200, description = "All campaigns, newest first", body = [CampaignResponse]),
        (status = 401, description = "Missing or invalid access token")
    ),
    security(("bearer_auth" = [])),
    tag = "campaigns"
)]
pub async fn list_campaigns(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<CampaignResponse>>, CampaignError> {
    let campaigns = state.campaigns.list().await?;
    Ok(Json(campaigns.into_iter().map(CampaignResponse::from).collect()))
}

/// GET /api/admin/campaigns/{id}
#[utoipa::path(
    get,
    path = "/api/admin/campaigns/{id}",
    params(("id" = i32, Path, description = "Campaign ID")),
    responses(
        (status = 200, description = "Campaign", body = CampaignResponse),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "Campaign not found")
    ),
    security(("bearer_auth" = [])),
    tag = "campaigns"
)]
pub async fn get_campaign(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<Json<CampaignResponse>, CampaignError> {
    let campaign = state
        .campaigns
        .find_by_id(id)
        .await?
        .ok_or(CampaignError::NotFound(id))?;

    Ok(Json(campaign.into()))
}

/// POST /api/admin/campaigns
#[utoipa::path(
    post,
    path = "/api/admin/campaigns",
    request_body = CampaignRequest,
    responses(
        (status = 201, description = "Campaign created", body = CampaignResponse),
        (status = 400, description = "Invalid campaign"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 409, description = "Campaign code already in use")
    ),
    security(("bearer_auth" = [])),
    tag = "campaigns"
)]
pub async fn create_campaign(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(request): Json<CampaignRequest>,
) -> Result<(StatusCode, Json<CampaignResponse>), CampaignError> {
    let new_campaign = request.into_new_campaign()?;

    let campaign = state.campaigns.create(&new_campaign).await?;
    info!(campaign_id = campaign.id, admin_id = admin.admin_id, "Campaign created");

    Ok((StatusCode::CREATED, Json(campaign.into())))
}

/// PUT /api/admin/campaigns/{id}
#[utoipa::path(
    put,
    path = "/api/admin/campaigns/{id}",
    params(("id" = i32, Path, description = "Campaign ID")),
    request_body = CampaignRequest,
    responses(
        (status = 200, description = "Campaign replaced", body = CampaignResponse),
        (status = 400, description = "Invalid campaign"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "Campaign not found"),
        (status = 409, description = "Campaign code already in use")
    ),
    security(("bearer_auth" = [])),
    tag = "campaigns"
)]
pub async fn update_campaign(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<i32>,
    Json(request): Json<CampaignRequest>,
) -> Result<Json<CampaignResponse>, CampaignError> {
    let new_campaign = request.into_new_campaign()?;

    let campaign = state
        .campaigns
        .update(id, &new_campaign)
        .await?
        .ok_or(CampaignError::NotFound(id))?;
    info!(campaign_id = id, admin_id = admin.admin_id, "Campaign updated");

    Ok(Json(campaign.into()))
}

/// DELETE /api/admin/campaigns/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/campaigns/{id}",
    params(("id" = i32, Path, description = "Campaign ID")),
    responses(
        (status = 204, description = "Campaign deleted"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "Campaign not found")
    ),
    security(("bearer_auth" = [])),
    tag = "campaigns"
)]
pub async fn delete_campaign(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, CampaignError> {
    if !state.campaigns.delete(id).await? {
        return Err(CampaignError::NotFound(id));
    }

    info!(campaign_id = id, admin_id = admin.admin_id, "Campaign deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/campaigns/code/{code}
/// Looks up a live manual-entry campaign by its code (case-insensitive)
#[utoipa::path(
    get,
    path = "/api/campaigns/code/{code}",
    params(("code" = String, Path, description = "Campaign code")),
    responses(
        (status = 200, description = "Live campaign with this code", body = CampaignResponse),
        (status = 404, description = "No live campaign has this code")
    ),
    tag = "campaigns"
)]
pub async fn campaign_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<CampaignResponse>, CampaignError> {
    let campaign = state
        .campaigns
        .find_live_by_code(&code, Utc::now())
        .await?
        .ok_or_else(|| CampaignError::CodeNotFound(code.trim().to_uppercase()))?;

    Ok(Json(campaign.into()))
}
