use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State},
    response::Json as ResponseJson,
    routing::post,
};
use deployment::Deployment;
use services::services::image_store::{UploadedImage, upload_product_image};
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError, middleware::AdminSession};

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const FILE_FIELD: &str = "file";

/// POST /api/upload
/// Stores the multipart field `file` and returns its public URL.
pub async fn upload_image(
    _session: AdminSession,
    State(deployment): State<DeploymentImpl>,
    mut multipart: Multipart,
) -> Result<ResponseJson<ApiResponse<UploadedImage>>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;

        let uploaded = upload_product_image(
            deployment.image_store().as_ref(),
            &file_name,
            &content_type,
            bytes,
        )
        .await?;
        return Ok(ResponseJson(ApiResponse::success(uploaded)));
    }
    Err(ApiError::BadRequest("no file provided".to_string()))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route("/upload", post(upload_image))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
