use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use deployment::Deployment;
use services::services::{
    admin_auth::{AdminAuthError, AdminLoginRequest, AdminSessionToken},
    catalog::{CatalogSnapshot, CatalogStats},
};
use tracing::{info, warn};
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError, middleware::AdminSession};

/// POST /api/admin/login
/// Exchange the admin password for a session token
pub async fn login(
    State(deployment): State<DeploymentImpl>,
    axum::Json(payload): axum::Json<AdminLoginRequest>,
) -> Result<ResponseJson<ApiResponse<AdminSessionToken>>, ApiError> {
    match deployment.admin_auth().login(&payload.password) {
        Ok(session) => {
            info!(expires_at = %session.expires_at, "Admin signed in");
            Ok(ResponseJson(ApiResponse::success(session)))
        }
        Err(err @ (AdminAuthError::InvalidPassword | AdminAuthError::Disabled)) => {
            warn!("Rejected admin login: {err}");
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

/// GET /api/admin/stats
/// Catalog counters for the dashboard
pub async fn stats(
    _session: AdminSession,
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<CatalogStats>>, ApiError> {
    let snapshot = CatalogSnapshot::load(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(snapshot.stats())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/admin",
        Router::new()
            .route("/login", post(login))
            .route("/stats", get(stats)),
    )
}
