use crate::redis_client::RedisClient;
use tracing::info;

pub mod seats;

pub use seats::SeatsTicket;

/// Redis-backed cache in front of the seat store.
///
/// Disabled when no Redis URL is configured; every lookup then misses and
/// every write is a no-op.
#[derive(Clone)]
pub struct CacheService {
    redis: Option<RedisClient>,
    /// Namespace for every key this service touches.
    prefix: String,
}

impl CacheService {
    pub fn new(redis: RedisClient, prefix: impl Into<String>) -> Self {
        Self {
            redis: Some(redis),
            prefix: prefix.into(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            redis: None,
            prefix: String::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.redis.is_some()
    }

    /// Prime the seat list right after startup seeding.
    pub async fn warmup_cache(&self, ticket: SeatsTicket, seats_json: &str) {
        if !self.is_enabled() {
            return;
        }
        info!("Starting cache warmup...");
        if let Err(e) = self.cache_seats(ticket, seats_json).await {
            tracing::warn!("Cache warmup failed: {:?}", e);
            return;
        }
        info!("Cache warmup done");
    }
}
