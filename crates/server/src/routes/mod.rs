use axum::{Router, routing::get};
use deployment::Deployment;
use services::services::image_store::LocalDiskStorage;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::DeploymentImpl;

pub mod admin;
pub mod catalog;
pub mod categories;
pub mod health;
pub mod order_link;
pub mod products;
pub mod upload;

pub fn router(deployment: DeploymentImpl) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health::health_check))
        .merge(products::router(&deployment))
        .merge(categories::router(&deployment))
        .merge(catalog::router(&deployment))
        .merge(order_link::router(&deployment))
        .merge(admin::router(&deployment))
        .merge(upload::router(&deployment));

    let mut app = Router::new().nest("/api", api_routes);
    if let Some(root) = deployment.config().image_storage.local_root() {
        app = app.nest_service(LocalDiskStorage::MOUNT_PATH, ServeDir::new(root));
    }

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(deployment)
}
