// HTTP handlers for the storefront catalog and pricing routes

use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::catalog::models::{Category, PriceQuote, ProductPage, ProductResponse, QuoteRequest};
use crate::catalog::query::{ProductQuery, QueryValidator};
use crate::error::ApiError;
use crate::pricing::{PackageQuote, PricedProduct};
use crate::AppState;

/// Handler for GET /api/products
/// Lists active products with filtering, sorting and pagination;
/// every item is priced by the batch resolver
#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Page of priced products", body = ProductPage),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductQuery>,
) -> Result<Json<ProductPage>, ApiError> {
    tracing::debug!("Listing products with query parameters: {:?}", params);

    let validated = QueryValidator::validate(params).map_err(|e| {
        tracing::debug!("Query validation failed: {}", e);
        ApiError::ValidationError(e.into())
    })?;

    let (products, total) = state.products.list(&validated).await?;

    let priced: Vec<PricedProduct> = products.iter().map(PricedProduct::from).collect();
    let mut pricing = state.pricing.price_products(&priced).await?;

    let items = products
        .into_iter()
        .map(|product| {
            let resolution = pricing
                .remove(&product.id)
                .ok_or_else(|| ApiError::InternalError(format!("product {} was not priced", product.id)))?;
            Ok(ProductResponse::new(product, resolution))
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    tracing::debug!("Returning {} of {} products", items.len(), total);
    Ok(Json(ProductPage {
        items,
        page: validated.page,
        limit: validated.limit,
        total,
    }))
}

/// Handler for GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Priced product", body = ProductResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductResponse>, ApiError> {
    tracing::debug!("Fetching product with id: {}", id);

    let product = state
        .products
        .find_active_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))?;

    let pricing = state.pricing.price_product(&PricedProduct::from(&product)).await?;

    Ok(Json(ProductResponse::new(product, pricing)))
}

/// Handler for GET /api/categories
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "All categories", body = Vec<Category>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = state.products.categories().await?;
    tracing::debug!("Retrieved {} categories", categories.len());
    Ok(Json(categories))
}

/// Handler for POST /api/pricing/quote
/// Prices a set of products in one pass; unknown or inactive ids are omitted
#[utoipa::path(
    post,
    path = "/api/pricing/quote",
    request_body = QuoteRequest,
    responses(
        (status = 200, description = "Pricing keyed by product id", body = PriceQuote),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "pricing"
)]
pub async fn quote_prices(
    State(state): State<AppState>,
    Json(payload): Json<QuoteRequest>,
) -> Result<Json<PriceQuote>, ApiError> {
    payload.validate()?;

    let ids = payload.unique_ids();
    tracing::debug!("Quoting {} products", ids.len());

    let products = state.products.find_active_by_ids(&ids).await?;
    let priced: Vec<PricedProduct> = products.iter().map(PricedProduct::from).collect();
    let pricing = state.pricing.price_products(&priced).await?;

    Ok(Json(PriceQuote(pricing.into_iter().collect())))
}

/// Handler for GET /api/packages/{id}/quote
#[utoipa::path(
    get,
    path = "/api/packages/{id}/quote",
    params(("id" = i32, Path, description = "Package campaign ID")),
    responses(
        (status = 200, description = "Package quote", body = PackageQuote),
        (status = 400, description = "Not an active package", body = ErrorResponse),
        (status = 404, description = "Campaign not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "pricing"
)]
pub async fn quote_package(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PackageQuote>, ApiError> {
    tracing::debug!("Quoting package campaign {}", id);
    let quote = state.pricing.quote_package(id).await?;
    Ok(Json(quote))
}
