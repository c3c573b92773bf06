use std::sync::Arc;

use async_trait::async_trait;
use db::DBService;
use services::services::{
    admin_auth::AdminAuthService,
    config::{Config, ConfigError},
    image_store::{ImageStore, ImageStoreError},
    order_link::OrderLinks,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    ImageStore(#[from] ImageStoreError),
}

/// Everything a request handler needs, cheap to clone into each request.
#[async_trait]
pub trait Deployment: Clone + Send + Sync + 'static {
    async fn new() -> Result<Self, DeploymentError>;

    fn config(&self) -> &Config;

    fn db(&self) -> &DBService;

    fn image_store(&self) -> &Arc<dyn ImageStore>;

    fn admin_auth(&self) -> &AdminAuthService;

    fn order_links(&self) -> &OrderLinks;
}
