use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::product::{CreateProduct, Product, UpdateProduct};
use deployment::Deployment;
use serde::Deserialize;
use services::services::catalog::{CatalogAdmin, Resynced};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError, middleware::AdminSession};

/// Body of `PUT /api/products`: the id plus whichever fields change.
#[derive(Debug, Deserialize, TS)]
pub struct UpdateProductRequest {
    #[ts(type = "number")]
    pub id: i64,
    #[serde(flatten)]
    pub changes: UpdateProduct,
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: i64,
}

/// GET /api/products
/// All products in store order.
pub async fn get_products(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<Product>>>, ApiError> {
    let products = Product::find_all(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(products)))
}

/// POST /api/products
/// Create a product and return the re-fetched list
pub async fn create_product(
    _session: AdminSession,
    State(deployment): State<DeploymentImpl>,
    axum::Json(payload): axum::Json<CreateProduct>,
) -> Result<ResponseJson<ApiResponse<Resynced<Product>>>, ApiError> {
    let result = CatalogAdmin::new(&deployment.db().pool)
        .create_product(payload)
        .await?;
    Ok(ResponseJson(ApiResponse::success(result)))
}

/// PUT /api/products
/// Apply a partial update to the product named by `id`
pub async fn update_product(
    _session: AdminSession,
    State(deployment): State<DeploymentImpl>,
    axum::Json(payload): axum::Json<UpdateProductRequest>,
) -> Result<ResponseJson<ApiResponse<Resynced<Product>>>, ApiError> {
    let result = CatalogAdmin::new(&deployment.db().pool)
        .update_product(payload.id, payload.changes)
        .await?;
    Ok(ResponseJson(ApiResponse::success(result)))
}

/// DELETE /api/products?id={id}
/// Delete a product; `item` is null in the response
pub async fn delete_product(
    _session: AdminSession,
    State(deployment): State<DeploymentImpl>,
    Query(query): Query<IdQuery>,
) -> Result<ResponseJson<ApiResponse<Resynced<Product>>>, ApiError> {
    let result = CatalogAdmin::new(&deployment.db().pool)
        .delete_product(query.id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(result)))
}

/// POST /api/products/{id}/toggle-featured
/// Flip the featured flag and nothing else
pub async fn toggle_featured(
    _session: AdminSession,
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Resynced<Product>>>, ApiError> {
    let result = CatalogAdmin::new(&deployment.db().pool)
        .toggle_featured(id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(result)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route(
            "/products",
            get(get_products)
                .post(create_product)
                .put(update_product)
                .delete(delete_product),
        )
        .route("/products/{id}/toggle-featured", post(toggle_featured))
}
