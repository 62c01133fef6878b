use crate::config::AppConfig;
use crate::users::{PgUserRepository, UserRepository};
use anyhow::Context;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        // Run migrations if present
        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }

        let users = Arc::new(PgUserRepository::new(db)) as Arc<dyn UserRepository>;
        Ok(Self::from_parts(users, config))
    }

    pub fn from_parts(users: Arc<dyn UserRepository>, config: Arc<AppConfig>) -> Self {
        Self { users, config }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::users::memory::InMemoryUserRepository;

        let users = Arc::new(InMemoryUserRepository::default()) as Arc<dyn UserRepository>;
        Self::from_parts(users, Arc::new(crate::config::test_config()))
    }
}
