use crate::config::{AppConfig, UserStore};
use crate::db;
use crate::users::{
    memory::InMemoryUserRepository,
    repo::{PgUserRepository, UserRepository},
    services::UserService,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: UserService,
}

impl AppState {
    /// Opens the configured store (running migrations for PostgreSQL).
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let repo: Arc<dyn UserRepository> = match config.store {
            UserStore::Postgres => {
                let pool = db::connect(&config).await?;
                db::migrate(&pool).await;
                Arc::new(PgUserRepository::new(pool))
            }
            UserStore::Memory => {
                tracing::warn!("using in-memory user store; data is lost on exit");
                Arc::new(InMemoryUserRepository::new())
            }
        };
        Ok(Self::from_parts(config, repo))
    }

    pub fn from_parts(config: Arc<AppConfig>, repo: Arc<dyn UserRepository>) -> Self {
        Self {
            config,
            users: UserService::new(repo),
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            store: UserStore::Memory,
            database_url: String::new(),
            db_max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            seed_demo_users: false,
        });
        Self::from_parts(config, Arc::new(InMemoryUserRepository::new()))
    }
}
