//! The counter-store client: a narrow, side-effecting capability set.
//!
//! A plain `INCR` with a follow-up `EXPIRE` is exactly the race this
//! system cannot tolerate: a slow client that crashes between the two
//! calls pins a bucket's TTL forever. `incr_and_expire` below instead
//! runs as a single Redis server-side script, so the increment and the
//! conditional TTL assignment are one atomic operation from the server's
//! point of view.

use async_trait::async_trait;
use deadpool_redis::{Config as RedisPoolConfig, Pool, Runtime};
use ratelimit_core::{Error, Result};
use redis::{AsyncCommands, Script};
use tracing::warn;

/// Narrow capability set required by the decision engine and the stats
/// projector. Each operation fails with `Error::StoreError` on transport or
/// parse failure; no operation here has any knowledge of tiers, users or
/// decisions.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increment the integer at `key` by 1 (absent counts as 0
    /// before the increment); if the resulting value is 1, set the key's
    /// TTL to `ttl_seconds`. Returns the post-increment value. Must be
    /// server-side atomic — see the module-level note.
    async fn incr_and_expire(&self, key: &str, ttl_seconds: u32) -> Result<i64>;

    /// Seconds until expiry, `-1` if the key exists without a TTL, `-2` if
    /// the key is absent.
    async fn ttl(&self, key: &str) -> Result<i64>;

    /// The stored integer value, or `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<i64>>;
}

/// The atomic increment-and-conditionally-expire script. `KEYS[1]` is the
/// bucket key, `ARGV[1]` is the TTL in seconds to apply only on first
/// creation.
const INCR_AND_EXPIRE_SCRIPT: &str = r#"
local current = redis.call('INCR', KEYS[1])
if current == 1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return current
"#;

/// Redis-backed counter store. Holds a lazily-initialised, pooled
/// connection manager; reconnection and pooling are `deadpool_redis`'s
/// responsibility.
pub struct RedisCounterStore {
    pool: Pool,
    script: Script,
}

impl RedisCounterStore {
    /// Build a store from a connection URL. The pool connects lazily; call
    /// [`RedisCounterStore::ready_check`] once at startup to surface
    /// connection failures before serving traffic.
    pub fn new(redis_url: &str) -> Result<Self> {
        let cfg = RedisPoolConfig::from_url(redis_url);
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| Error::store_with_source("failed to create redis pool", e))?;
        Ok(Self {
            pool,
            script: Script::new(INCR_AND_EXPIRE_SCRIPT),
        })
    }

    /// Explicit readiness check, performed once at process startup so that
    /// a misconfigured counter store fails fast rather than on the first
    /// request.
    pub async fn ready_check(&self) -> Result<()> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| Error::store_with_source("failed to acquire redis connection", e))?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::store_with_source("redis PING failed", e))?;
        Ok(())
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn incr_and_expire(&self, key: &str, ttl_seconds: u32) -> Result<i64> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| Error::store_with_source("failed to acquire redis connection", e))?;
        let value: i64 = self
            .script
            .key(key)
            .arg(ttl_seconds)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| Error::store_with_source("incrAndExpire failed", e))?;
        Ok(value)
    }

    async fn ttl(&self, key: &str) -> Result<i64> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| Error::store_with_source("failed to acquire redis connection", e))?;
        let ttl: i64 = conn
            .ttl(key)
            .await
            .map_err(|e| Error::store_with_source("ttl failed", e))?;
        Ok(ttl)
    }

    async fn get(&self, key: &str) -> Result<Option<i64>> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| Error::store_with_source("failed to acquire redis connection", e))?;
        let raw: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| Error::store_with_source("get failed", e))?;
        match raw {
            None => Ok(None),
            Some(s) => s.parse::<i64>().map(Some).map_err(|_| {
                warn!(key, value = %s, "counter store returned a non-numeric reply");
                Error::store("non-numeric result")
            }),
        }
    }
}
