use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::config::{AppConfig, StoreBackend};
use crate::customers::{memory::InMemoryCustomerStore, repo::CustomerStore, repo::PgCustomerStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn CustomerStore>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let store = match config.store_backend {
            StoreBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is not set")?;
                let db = PgPoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .connect(url)
                    .await
                    .context("connect to database")?;

                if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
                    tracing::warn!(error = %e, "migration failed; continuing");
                }
                Arc::new(PgCustomerStore::new(db)) as Arc<dyn CustomerStore>
            }
            StoreBackend::Memory => {
                tracing::warn!("using in-memory customer store; data is lost on restart");
                Arc::new(InMemoryCustomerStore::default()) as Arc<dyn CustomerStore>
            }
        };

        Ok(Self { config, store })
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self {
            config: Arc::new(AppConfig::in_memory()),
            store: Arc::new(InMemoryCustomerStore::default()),
        }
    }
}
