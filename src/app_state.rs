use sqlx::SqlitePool;
use std::sync::Arc;

use crate::{
    repositories::{ArticleRepository, ArticleStore},
    scoring::ThreatPolicy,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ArticleStore>,
    pub db_pool: SqlitePool,
    pub threat_policy: ThreatPolicy,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            store: Arc::new(ArticleRepository::new(pool.clone())),
            db_pool: pool,
            threat_policy: ThreatPolicy::default(),
        }
    }
}
