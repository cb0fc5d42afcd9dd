use std::sync::Arc;

use travlr_core::memory::{MemoryTripRepository, MemoryUserRepository};
use travlr_core::repository::{TripRepository, UserRepository};

pub mod app_config;
pub mod database;
pub mod trip_repo;
pub mod user_repo;

pub use database::DbClient;
pub use trip_repo::StoreTripRepository;
pub use user_repo::StoreUserRepository;

/// The Trip Store and Credential Store the services run against.
#[derive(Clone)]
pub struct Repositories {
    pub trips: Arc<dyn TripRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// Postgres when a URL is configured (migrations are applied first),
    /// otherwise in-memory stores that vanish with the process.
    pub async fn connect(config: &app_config::DatabaseConfig) -> Result<Self, sqlx::Error> {
        match config.url.as_deref() {
            Some(url) => {
                let db = DbClient::new(url).await?;
                db.migrate().await?;
                Ok(Self {
                    trips: Arc::new(StoreTripRepository::new(db.pool.clone())),
                    users: Arc::new(StoreUserRepository::new(db.pool)),
                })
            }
            None => {
                tracing::warn!("No database.url configured, using in-memory storage");
                Ok(Self::in_memory())
            }
        }
    }

    pub fn in_memory() -> Self {
        Self {
            trips: Arc::new(MemoryTripRepository::new()),
            users: Arc::new(MemoryUserRepository::new()),
        }
    }
}
