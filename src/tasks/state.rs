use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::TaskConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<TaskConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(TaskConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(config.pool.max_connections)
            .acquire_timeout(Duration::from_secs(config.pool.acquire_timeout_secs))
            .connect(&config.database_url)
            .await
            .context("connect to task database")?;

        Ok(Self { db, config })
    }

    pub fn from_parts(db: PgPool, config: Arc<TaskConfig>) -> Self {
        Self { db, config }
    }
}
