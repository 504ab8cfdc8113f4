//! Zen Sticker storefront backend
//!
//! Serves the product catalog with campaign-resolved prices, campaign
//! administration behind admin JWT auth, and package quotes.

pub mod auth;
pub mod campaigns;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod pricing;
pub mod validation;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use auth::{AdminRepository, AuthService, TokenRepository, TokenService};
use campaigns::CampaignRepository;
use catalog::ProductRepository;
use config::Config;
use pricing::{PgCampaignStore, PricingService};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        catalog::handlers::list_products,
        catalog::handlers::get_product,
        catalog::handlers::list_categories,
        catalog::handlers::quote_prices,
        catalog::handlers::quote_package,
        campaigns::handlers::list_campaigns,
        campaigns::handlers::get_campaign,
        campaigns::handlers::create_campaign,
        campaigns::handlers::update_campaign,
        campaigns::handlers::delete_campaign,
        campaigns::handlers::campaign_by_code,
        auth::handlers::login_handler,
        auth::handlers::refresh_handler,
        auth::handlers::me_handler,
    ),
    components(schemas(
        catalog::Product,
        catalog::Category,
        catalog::ProductResponse,
        catalog::ProductPage,
        catalog::QuoteRequest,
        catalog::PriceQuote,
        pricing::CampaignType,
        pricing::PriceResolution,
        pricing::PackageQuote,
        pricing::PackageQuoteItem,
        campaigns::CampaignRequest,
        campaigns::CampaignResponse,
        auth::LoginRequest,
        auth::RefreshRequest,
        auth::AuthResponse,
        auth::AdminResponse,
        error::ErrorResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "catalog", description = "Products and categories with campaign prices"),
        (name = "pricing", description = "Price and package quotes"),
        (name = "campaigns", description = "Campaign administration"),
        (name = "auth", description = "Admin authentication")
    ),
    info(
        title = "Zen Sticker API",
        version = "1.0.0",
        description = "Sticker storefront with campaign discount resolution"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub products: ProductRepository,
    pub pricing: PricingService,
    pub campaigns: CampaignRepository,
    pub auth: AuthService,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        let tokens = Arc::new(TokenService::new(&config.jwt_secret));

        Self {
            products: ProductRepository::new(pool.clone()),
            pricing: PricingService::new(Arc::new(PgCampaignStore::new(pool.clone()))),
            campaigns: CampaignRepository::new(pool.clone()),
            auth: AuthService::new(
                AdminRepository::new(pool.clone()),
                TokenRepository::new(pool),
                tokens.clone(),
            ),
            tokens,
        }
    }
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Creates and configures the application router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health))
        // Storefront
        .route("/api/products", get(catalog::list_products))
        .route("/api/products/:id", get(catalog::get_product))
        .route("/api/categories", get(catalog::list_categories))
        .route("/api/pricing/quote", post(catalog::quote_prices))
        .route("/api/packages/:id/quote", get(catalog::quote_package))
        .route("/api/campaigns/code/:code", get(campaigns::campaign_by_code))
        // Admin
        .route("/api/admin/auth/login", post(auth::login_handler))
        .route("/api/admin/auth/refresh", post(auth::refresh_handler))
        .route("/api/admin/auth/me", get(auth::me_handler))
        .route(
            "/api/admin/campaigns",
            get(campaigns::list_campaigns).post(campaigns::create_campaign),
        )
        .route(
            "/api/admin/campaigns/:id",
            get(campaigns::get_campaign)
                .put(campaigns::update_campaign)
                .delete(campaigns::delete_campaign),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests;
