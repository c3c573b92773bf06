use std::sync::Arc;

use async_trait::async_trait;
use db::DBService;
use deployment::{Deployment, DeploymentError};
use services::services::{
    admin_auth::AdminAuthService,
    config::Config,
    image_store::{self, ImageStore},
    order_link::OrderLinks,
};
use tracing::info;

#[derive(Clone)]
pub struct LocalDeployment {
    config: Arc<Config>,
    db: DBService,
    image_store: Arc<dyn ImageStore>,
    admin_auth: Arc<AdminAuthService>,
    order_links: OrderLinks,
}

impl LocalDeployment {
    /// Wire up a deployment from an already-loaded configuration and store.
    pub fn from_parts(config: Config, db: DBService) -> Result<Self, DeploymentError> {
        let image_store = image_store::from_config(&config.image_storage)?;
        info!(
            image_storage = config.image_storage.kind(),
            admin_enabled = config.admin_password.is_some(),
            "Deployment configured"
        );
        let admin_auth = AdminAuthService::new(
            config.admin_password.as_ref(),
            config.admin_session_secret.as_ref(),
            config.admin_session_ttl,
        );
        let order_links = OrderLinks::new(&config.whatsapp_number, config.store_name.clone());
        Ok(Self {
            config: Arc::new(config),
            db,
            image_store,
            admin_auth: Arc::new(admin_auth),
            order_links,
        })
    }
}

#[async_trait]
impl Deployment for LocalDeployment {
    async fn new() -> Result<Self, DeploymentError> {
        let config = Config::from_env()?;
        let db = DBService::new(&config.database_url).await?;
        Self::from_parts(config, db)
    }

    fn config(&self) -> &Config {
        &self.config
    }

    fn db(&self) -> &DBService {
        &self.db
    }

    fn image_store(&self) -> &Arc<dyn ImageStore> {
        &self.image_store
    }

    fn admin_auth(&self) -> &AdminAuthService {
        &self.admin_auth
    }

    fn order_links(&self) -> &OrderLinks {
        &self.order_links
    }
}
