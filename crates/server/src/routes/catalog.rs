//! Read-only storefront views computed from a fresh catalog snapshot.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use deployment::Deployment;
use services::services::{
    catalog::{CatalogSnapshot, ProductDetail},
    catalog_query::{CatalogPage, CatalogQuery, CatalogQueryParams},
};
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError};

/// GET /api/catalog/products?search&category&sort
/// Filtered and sorted catalog page
pub async fn search_products(
    State(deployment): State<DeploymentImpl>,
    Query(params): Query<CatalogQueryParams>,
) -> Result<ResponseJson<ApiResponse<CatalogPage>>, ApiError> {
    let snapshot = CatalogSnapshot::load(&deployment.db().pool).await?;
    let page = snapshot.page(&CatalogQuery::from(params));
    Ok(ResponseJson(ApiResponse::success(page)))
}

/// GET /api/catalog/featured?search&category&sort
/// Same as [`search_products`] with the featured-only stage forced on.
pub async fn featured_products(
    State(deployment): State<DeploymentImpl>,
    Query(params): Query<CatalogQueryParams>,
) -> Result<ResponseJson<ApiResponse<CatalogPage>>, ApiError> {
    let snapshot = CatalogSnapshot::load(&deployment.db().pool).await?;
    let query = CatalogQuery {
        featured_only: true,
        ..CatalogQuery::from(params)
    };
    Ok(ResponseJson(ApiResponse::success(snapshot.page(&query))))
}

/// GET /api/catalog/products/{slug}
/// Product with up to four related products from its category
pub async fn product_detail(
    State(deployment): State<DeploymentImpl>,
    Path(slug): Path<String>,
) -> Result<ResponseJson<ApiResponse<ProductDetail>>, ApiError> {
    let snapshot = CatalogSnapshot::load(&deployment.db().pool).await?;
    let detail = snapshot
        .product_detail(&slug)
        .ok_or(ApiError::NotFound("product"))?;
    Ok(ResponseJson(ApiResponse::success(detail)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/catalog",
        Router::new()
            .route("/products", get(search_products))
            .route("/products/{slug}", get(product_detail))
            .route("/featured", get(featured_products)),
    )
}
