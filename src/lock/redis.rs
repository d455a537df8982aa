use std::time::{Duration, Instant};

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::LockSettings;
use crate::error::{AppError, Result};
use crate::lock::manager::{LockHandle, LockManager};
use crate::observability::mask_account_number;

/// Atomic compare-and-delete: only the holder that set the token may
/// remove the key.
const RELEASE_SCRIPT: &str = r#"
if redis.call('get', KEYS[1]) == ARGV[1] then
    return redis.call('del', KEYS[1])
else
    return 0
end
"#;

/// Redis-backed lock manager: `SET key token NX PX lease` with a bounded
/// retry loop for the wait window.
///
/// Lock acquisition fails closed: a Redis error surfaces to the caller
/// instead of degrading to an unlocked operation.
pub struct RedisLockManager {
    client: redis::Client,
    key_prefix: String,
    retry_interval: Duration,
}

impl RedisLockManager {
    pub fn new(client: redis::Client, settings: &LockSettings) -> Self {
        Self {
            client,
            key_prefix: settings.key_prefix.clone(),
            retry_interval: Duration::from_millis(settings.retry_interval_ms),
        }
    }

    fn redis_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl LockManager for RedisLockManager {
    async fn acquire(
        &self,
        key: &str,
        wait_timeout: Duration,
        lease_timeout: Duration,
    ) -> Result<LockHandle> {
        let redis_key = self.redis_key(key);
        let token = Uuid::new_v4().simple().to_string();
        let lease_ms = lease_timeout.as_millis() as u64;

        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(AppError::Redis)?;

        let deadline = Instant::now() + wait_timeout;
        loop {
            let acquired: Option<String> = redis::cmd("SET")
                .arg(&redis_key)
                .arg(&token)
                .arg("NX")
                .arg("PX")
                .arg(lease_ms)
                .query_async(&mut conn)
                .await
                .map_err(AppError::Redis)?;

            if acquired.is_some() {
                return Ok(LockHandle::new(key, token));
            }

            if Instant::now() + self.retry_interval > deadline {
                tracing::debug!(
                    account = %mask_account_number(key),
                    wait_ms = wait_timeout.as_millis() as u64,
                    "lock wait exhausted"
                );
                return Err(AppError::LockBusy);
            }
            tokio::time::sleep(self.retry_interval).await;
        }
    }

    async fn release(&self, handle: LockHandle) -> Result<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(AppError::Redis)?;

        let released: i64 = redis::cmd("EVAL")
            .arg(RELEASE_SCRIPT)
            .arg(1)
            .arg(self.redis_key(handle.key()))
            .arg(handle.token())
            .query_async(&mut conn)
            .await
            .map_err(AppError::Redis)?;

        if released == 0 {
            // Lease expired, or the key was already taken over. Nothing to
            // undo; the new holder keeps its lock.
            tracing::warn!(
                account = %mask_account_number(handle.key()),
                "lock was no longer held at release"
            );
        }
        Ok(())
    }
}
