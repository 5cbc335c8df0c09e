use crate::cache::CacheService;
use redis::AsyncCommands;
use tracing::debug;

/// Upper bound on staleness if an invalidation is lost.
const SEATS_TTL_SECONDS: u64 = 60;

// KEYS[1] = version key, KEYS[2] = payload key
// ARGV[1] = version read before the store query, ARGV[2] = payload, ARGV[3] = ttl
const STORE_IF_CURRENT: &str = r#"
if (redis.call('GET', KEYS[1]) or '0') == ARGV[1] then
    redis.call('SET', KEYS[2], ARGV[2], 'EX', ARGV[3])
    return 1
end
return 0
"#;

/// Seat list version observed before reading the store.
///
/// A payload is only written back if no invalidation happened since the
/// ticket was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatsTicket(u64);

impl CacheService {
    fn seats_key(&self) -> String {
        format!("{}:seats:all", self.prefix)
    }

    fn version_key(&self) -> String {
        format!("{}:seats:version", self.prefix)
    }

    /// Serialized `GET /seats` payload, if cached.
    pub async fn get_cached_seats(&self) -> Result<Option<String>, redis::RedisError> {
        let Some(redis) = &self.redis else {
            return Ok(None);
        };
        let mut conn = redis.conn.clone();
        conn.get(self.seats_key()).await
    }

    /// Take this before querying the store for the payload to cache.
    pub async fn seats_ticket(&self) -> Result<SeatsTicket, redis::RedisError> {
        let Some(redis) = &self.redis else {
            return Ok(SeatsTicket(0));
        };
        let mut conn = redis.conn.clone();
        let version: Option<u64> = conn.get(self.version_key()).await?;
        Ok(SeatsTicket(version.unwrap_or(0)))
    }

    /// Cache `seats_json` unless the seat list changed after `ticket` was taken.
    /// Returns whether the payload was stored.
    pub async fn cache_seats(&self, ticket: SeatsTicket, seats_json: &str) -> Result<bool, redis::RedisError> {
        let Some(redis) = &self.redis else {
            return Ok(false);
        };
        let mut conn = redis.conn.clone();
        let stored: i32 = redis::Script::new(STORE_IF_CURRENT)
            .key(self.version_key())
            .key(self.seats_key())
            .arg(ticket.0)
            .arg(seats_json)
            .arg(SEATS_TTL_SECONDS)
            .invoke_async(&mut conn)
            .await?;
        if stored == 0 {
            debug!("Seat list changed while it was read, not caching");
        }
        Ok(stored == 1)
    }

    /// Drop the cached seat list after any status change.
    pub async fn invalidate_seats(&self) {
        let Some(redis) = &self.redis else {
            return;
        };
        let mut conn = redis.conn.clone();
        let result: Result<(), _> = redis::pipe()
            .atomic()
            .incr(self.version_key(), 1)
            .ignore()
            .del(self.seats_key())
            .ignore()
            .query_async(&mut conn)
            .await;
        if let Err(e) = result {
            tracing::warn!("Failed to invalidate seats cache: {:?}", e);
            return;
        }
        debug!("Invalidated seats cache");
    }
}
