use redis::RedisResult;
use tracing::info;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        info!("Redis client configured for rate limiting");
        Ok(Self { client })
    }

    /// Fixed-window counter. Returns `true` while `key` is under `limit`
    /// hits in the current window.
    pub async fn check_rate_limit(&self, key: &str, limit: i64, window_seconds: i64) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let (count,): (i64,) = window_counter(key, window_seconds).query_async(&mut conn).await?;

        Ok(count <= limit)
    }
}

/// `SET NX EX` starts the window and its TTL only when the key is absent;
/// `INCR` keeps the existing TTL, so later hits never extend the window.
fn window_counter(key: &str, window_seconds: i64) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .cmd("SET")
        .arg(key)
        .arg(0)
        .arg("EX")
        .arg(window_seconds)
        .arg("NX")
        .ignore()
        .incr(key, 1);
    pipe
}
