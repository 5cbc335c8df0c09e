use redis::{aio::MultiplexedConnection, Client};
use tracing::info;

/// Cloneable handle to the Redis instance used for the seat list cache.
#[derive(Clone)]
pub struct RedisClient {
    pub conn: MultiplexedConnection,
}

impl RedisClient {
    /// Open a multiplexed connection and make sure the server answers.
    pub async fn connect(redis_url: &str) -> redis::RedisResult<Self> {
        let client = Client::open(redis_url)?;
        let mut conn = client.get_multiplexed_tokio_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        info!("Redis answered {}", pong);
        Ok(RedisClient { conn })
    }
}
