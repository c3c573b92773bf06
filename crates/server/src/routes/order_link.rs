use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::product::Product;
use deployment::Deployment;
use serde::Deserialize;
use services::services::order_link::OrderLink;
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrderLinkQuery {
    /// Product slug; omitted for a general store inquiry.
    pub product: Option<String>,
}

/// GET /api/order-link?product={slug}
/// WhatsApp link for a product, or a general store inquiry without `product`
pub async fn get_order_link(
    State(deployment): State<DeploymentImpl>,
    Query(query): Query<OrderLinkQuery>,
) -> Result<ResponseJson<ApiResponse<OrderLink>>, ApiError> {
    let links = deployment.order_links();
    let link = match query.product.as_deref().filter(|s| !s.is_empty()) {
        Some(slug) => {
            let product = Product::find_by_slug(&deployment.db().pool, slug)
                .await?
                .ok_or(ApiError::NotFound("product"))?;
            links.product_inquiry(&product.name)
        }
        None => links.general_inquiry(),
    };
    Ok(ResponseJson(ApiResponse::success(link)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route("/order-link", get(get_order_link))
}
