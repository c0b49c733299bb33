use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use crate::services::image_store::ImageStore;

/// Contexte applicatif construit une fois au démarrage et partagé par toutes les routes
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub images: Arc<dyn ImageStore>,
}
