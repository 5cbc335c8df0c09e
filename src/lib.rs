pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod models;
pub mod redis_client;
pub mod services;
pub mod store;

use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use config::{Config, StoreBackend};
use services::reservation::ReservationService;
use store::{MemorySeatStore, PgSeatStore, SeatStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("DATABASE_URL must be set for the postgres store")]
    MissingDatabaseUrl,
    #[error("failed to connect to database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to connect to Redis: {0}")]
    Redis(#[from] redis::RedisError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

// Shared state for every handler
#[derive(Clone)]
pub struct AppState {
    pub reservations: ReservationService,
    pub cache: cache::CacheService,
}

impl AppState {
    pub fn new(store: Arc<dyn SeatStore>, cache: cache::CacheService, max_attempts: u32) -> Arc<Self> {
        let reservations = ReservationService::new(store, cache.clone(), max_attempts);
        Arc::new(Self { reservations, cache })
    }

    /// Connect the configured backends, migrate, and seed the venue.
    pub async fn from_config(config: &Config) -> Result<Arc<Self>, StartupError> {
        let store: Arc<dyn SeatStore> = match config.store.backend {
            StoreBackend::Postgres => {
                let url = config
                    .database
                    .url
                    .as_deref()
                    .ok_or(StartupError::MissingDatabaseUrl)?;
                let db = database::Database::connect(url, &config.database).await?;
                db.run_migrations().await.map_err(StoreError::from)?;
                Arc::new(PgSeatStore::new(db))
            }
            StoreBackend::Memory => {
                info!("Using in-memory seat store");
                Arc::new(MemorySeatStore::new())
            }
        };

        let cache = match &config.redis.url {
            Some(url) => {
                let redis = redis_client::RedisClient::connect(url).await?;
                cache::CacheService::new(redis, config.redis.key_prefix.clone())
            }
            None => cache::CacheService::disabled(),
        };

        let state = Self::new(store, cache, config.reservation.max_attempts);

        let created = state.reservations.seed().await?;
        if created > 0 {
            info!("Initialized {} seats", created);
        }

        if state.cache.is_enabled() {
            state.warmup().await?;
        }

        Ok(state)
    }

    async fn warmup(&self) -> Result<(), StoreError> {
        let ticket = match self.cache.seats_ticket().await {
            Ok(ticket) => ticket,
            Err(e) => {
                tracing::warn!("Cache warmup skipped: {:?}", e);
                return Ok(());
            }
        };
        let seats = self.reservations.list_seats().await?;
        match serde_json::to_string(&seats) {
            Ok(json) => self.cache.warmup_cache(ticket, &json).await,
            Err(e) => tracing::warn!("Cache warmup skipped, seats did not serialize: {:?}", e),
        }
        Ok(())
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(controllers::routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{AppConfig, DatabaseConfig, LogFormat, RedisConfig, ReservationConfig, StoreConfig};

    fn config(backend: StoreBackend, database_url: Option<&str>) -> Config {
        Config {
            app: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                environment: "test".to_string(),
                rust_log: "info".to_string(),
                log_format: LogFormat::Pretty,
            },
            store: StoreConfig { backend },
            database: DatabaseConfig {
                url: database_url.map(str::to_string),
                pool_size: 1,
            },
            redis: RedisConfig {
                url: None,
                key_prefix: "seat_reservation_test".to_string(),
            },
            reservation: ReservationConfig { max_attempts: 3 },
        }
    }

    #[tokio::test]
    async fn postgres_backend_requires_database_url() {
        let result = AppState::from_config(&config(StoreBackend::Postgres, None)).await;
        assert!(matches!(result, Err(StartupError::MissingDatabaseUrl)));
    }

    #[tokio::test]
    async fn memory_backend_starts_seeded() {
        let state = AppState::from_config(&config(StoreBackend::Memory, None)).await.unwrap();
        assert_eq!(state.reservations.store().count().await.unwrap(), 80);
        assert!(!state.cache.is_enabled());
    }
}
