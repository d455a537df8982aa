use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::lock::manager::{LockHandle, LockManager};

/// In-process lock manager: one async mutex per key.
///
/// Serves tests and single-instance deployments with the same contract as
/// the Redis manager. The lease timeout is ignored; when the process dies,
/// every lock dies with it. Unlike the Redis manager there is no lease to
/// reclaim a key whose holder was dropped between acquire and release, so
/// callers must pair every successful acquire with a release.
#[derive(Default)]
pub struct LocalLockManager {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    held: Mutex<HashMap<String, OwnedMutexGuard<()>>>,
}

impl LocalLockManager {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LockManager for LocalLockManager {
    async fn acquire(
        &self,
        key: &str,
        wait_timeout: Duration,
        _lease_timeout: Duration,
    ) -> Result<LockHandle> {
        let entry = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        let guard = tokio::time::timeout(wait_timeout, entry.lock_owned())
            .await
            .map_err(|_| AppError::LockBusy)?;

        let token = Uuid::new_v4().simple().to_string();
        self.held.lock().await.insert(token.clone(), guard);
        Ok(LockHandle::new(key, token))
    }

    async fn release(&self, handle: LockHandle) -> Result<()> {
        // Dropping the parked guard unlocks the key.
        match self.held.lock().await.remove(handle.token()) {
            Some(guard) => drop(guard),
            None => {
                tracing::warn!(key = %handle.key(), "lock was no longer held at release");
                return Ok(());
            }
        }

        // Prune the key's mutex once nothing else references it. Waiters
        // hold their own clone of the entry, which keeps it alive.
        let mut locks = self.locks.lock().await;
        if locks
            .get(handle.key())
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            locks.remove(handle.key());
        }
        Ok(())
    }
}
