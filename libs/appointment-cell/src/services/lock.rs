// libs/appointment-cell/src/services/lock.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use deadpool_redis::{Config, Connection, Pool, Runtime};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::LockError;

/// Deletes the key only while it still holds our token.
const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

/// Proof of holding a slot key until `release` or TTL expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotLease {
    pub key: String,
    pub token: String,
}

impl SlotLease {
    fn new(key: &str) -> Self {
        Self { key: key.to_string(), token: Uuid::new_v4().to_string() }
    }
}

pub fn slot_key(date: NaiveDate, time: &str) -> String {
    format!("slot:{}:{}", date.format("%Y-%m-%d"), time.trim())
}

/// Serializes check-then-insert per slot. `acquire` returns `None` when
/// someone else holds the key.
#[async_trait]
pub trait SlotLock: Send + Sync {
    async fn acquire(&self, key: &str, ttl: Duration) -> Result<Option<SlotLease>, LockError>;

    async fn release(&self, lease: &SlotLease) -> Result<(), LockError>;
}

// ==============================================================================
// REDIS
// ==============================================================================

pub struct RedisSlotLock {
    pool: Pool,
}

impl RedisSlotLock {
    pub async fn connect(redis_url: &str) -> Result<Self, LockError> {
        let pool = Config::from_url(redis_url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| LockError::Backend(format!("Pool creation error: {}", e)))?;

        let lock = Self { pool };
        let mut conn = lock.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;

        info!("Redis slot lock initialized");
        Ok(lock)
    }

    async fn connection(&self) -> Result<Connection, LockError> {
        self.pool
            .get()
            .await
            .map_err(|e| LockError::Backend(format!("Failed to get Redis connection: {}", e)))
    }
}

#[async_trait]
impl SlotLock for RedisSlotLock {
    async fn acquire(&self, key: &str, ttl: Duration) -> Result<Option<SlotLease>, LockError> {
        let lease = SlotLease::new(key);
        let mut conn = self.connection().await?;

        let reply: Option<String> = redis::cmd("SET")
            .arg(&lease.key)
            .arg(&lease.token)
            .arg("NX")
            .arg("PX")
            .arg(ttl.as_millis() as u64)
            .query_async(&mut conn)
            .await?;

        if reply.is_some() {
            debug!("Acquired slot lock {}", key);
            Ok(Some(lease))
        } else {
            debug!("Slot lock {} is held elsewhere", key);
            Ok(None)
        }
    }

    async fn release(&self, lease: &SlotLease) -> Result<(), LockError> {
        let mut conn = self.connection().await?;
        let deleted: i64 = redis::Script::new(RELEASE_SCRIPT)
            .key(&lease.key)
            .arg(&lease.token)
            .invoke_async(&mut conn)
            .await?;

        if deleted == 0 {
            warn!("Slot lock {} expired before release", lease.key);
        }
        Ok(())
    }
}

// ==============================================================================
// IN-MEMORY
// ==============================================================================

/// Single-process lock. Only serializes requests handled by this instance.
#[derive(Default)]
pub struct InMemorySlotLock {
    held: Mutex<HashMap<String, (String, Instant)>>,
}

impl InMemorySlotLock {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SlotLock for InMemorySlotLock {
    async fn acquire(&self, key: &str, ttl: Duration) -> Result<Option<SlotLease>, LockError> {
        let mut held = self.held.lock().await;
        let now = Instant::now();

        if let Some((_, expires_at)) = held.get(key) {
            if *expires_at > now {
                return Ok(None);
            }
        }

        let lease = SlotLease::new(key);
        held.insert(lease.key.clone(), (lease.token.clone(), now + ttl));
        Ok(Some(lease))
    }

    async fn release(&self, lease: &SlotLease) -> Result<(), LockError> {
        let mut held = self.held.lock().await;
        if held.get(&lease.key).map(|(token, _)| token == &lease.token).unwrap_or(false) {
            held.remove(&lease.key);
        }
        Ok(())
    }
}
