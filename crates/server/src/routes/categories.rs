use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::category::{Category, CreateCategory, UpdateCategory};
use deployment::Deployment;
use serde::Deserialize;
use services::services::catalog::{CatalogAdmin, Resynced};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError, middleware::AdminSession, routes::products::IdQuery};

#[derive(Debug, Deserialize, TS)]
pub struct UpdateCategoryRequest {
    #[ts(type = "number")]
    pub id: i64,
    #[serde(flatten)]
    pub changes: UpdateCategory,
}

/// GET /api/categories
/// All categories in store order
pub async fn get_categories(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<Category>>>, ApiError> {
    let categories = Category::find_all(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(categories)))
}

/// POST /api/categories
/// Create a category; the slug is derived from the name when omitted
pub async fn create_category(
    _session: AdminSession,
    State(deployment): State<DeploymentImpl>,
    axum::Json(payload): axum::Json<CreateCategory>,
) -> Result<ResponseJson<ApiResponse<Resynced<Category>>>, ApiError> {
    let result = CatalogAdmin::new(&deployment.db().pool)
        .create_category(payload)
        .await?;
    Ok(ResponseJson(ApiResponse::success(result)))
}

/// PUT /api/categories
/// A changed slug also moves every product filed under the old one.
pub async fn update_category(
    _session: AdminSession,
    State(deployment): State<DeploymentImpl>,
    axum::Json(payload): axum::Json<UpdateCategoryRequest>,
) -> Result<ResponseJson<ApiResponse<Resynced<Category>>>, ApiError> {
    let result = CatalogAdmin::new(&deployment.db().pool)
        .update_category(payload.id, payload.changes)
        .await?;
    Ok(ResponseJson(ApiResponse::success(result)))
}

/// DELETE /api/categories?id={id}
/// Delete a category that no product uses
pub async fn delete_category(
    _session: AdminSession,
    State(deployment): State<DeploymentImpl>,
    Query(query): Query<IdQuery>,
) -> Result<ResponseJson<ApiResponse<Resynced<Category>>>, ApiError> {
    let result = CatalogAdmin::new(&deployment.db().pool)
        .delete_category(query.id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(result)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route(
        "/categories",
        get(get_categories)
            .post(create_category)
            .put(update_category)
            .delete(delete_category),
    )
}
