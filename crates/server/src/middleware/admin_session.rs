use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use deployment::Deployment;
use services::services::admin_auth::AdminClaims;
use tracing::warn;

use crate::{DeploymentImpl, error::ApiError};

/// Extractor guarding admin routes: a valid `Authorization: Bearer` session.
pub struct AdminSession(pub AdminClaims);

impl FromRequestParts<DeploymentImpl> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        deployment: &DeploymentImpl,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, deployment)
                .await
                .map_err(|_| ApiError::Unauthorized)?;

        match deployment.admin_auth().verify(bearer.token()) {
            Ok(claims) => Ok(AdminSession(claims)),
            Err(err) => {
                warn!(path = %parts.uri.path(), "Rejected admin request: {err}");
                Err(ApiError::Unauthorized)
            }
        }
    }
}
