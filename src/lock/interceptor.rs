use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::lock::manager::LockManager;
use crate::observability::{get_metrics, mask_account_number};

/// Requests that need exclusive access to one account implement this to
/// expose the lock key. The set of implementors is closed and explicit;
/// there is no reflection anywhere in the flow. The target is borrowed
/// across the acquire/release awaits, so implementors must be thread-safe.
pub trait LockTarget: Send + Sync {
    /// The account number the operation transacts against.
    fn lock_key(&self) -> &str;
}

/// Explicit decorator that brackets an operation with lock acquire/release.
///
/// `around` guarantees release on every exit path of the wrapped operation.
/// When acquisition fails the operation is never invoked and `LockBusy`
/// propagates untouched, so callers can distinguish contention from
/// business failures.
pub struct LockInterceptor {
    manager: Arc<dyn LockManager>,
    wait_timeout: Duration,
    lease_timeout: Duration,
}

impl LockInterceptor {
    pub fn new(
        manager: Arc<dyn LockManager>,
        wait_timeout: Duration,
        lease_timeout: Duration,
    ) -> Self {
        Self {
            manager,
            wait_timeout,
            lease_timeout,
        }
    }

    /// Overrides the wait window for one call site.
    pub fn with_wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }

    pub async fn around<T, F, Fut>(&self, target: &dyn LockTarget, op: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let key = target.lock_key();
        let started = Instant::now();

        let handle = match self
            .manager
            .acquire(key, self.wait_timeout, self.lease_timeout)
            .await
        {
            Ok(handle) => handle,
            Err(err) => {
                get_metrics().record_lock_busy();
                return Err(err);
            }
        };
        get_metrics().record_lock_acquired(started.elapsed().as_secs_f64() * 1000.0);
        tracing::debug!(account = %mask_account_number(key), "account lock acquired");

        let result = op().await;

        if let Err(err) = self.manager.release(handle).await {
            // The operation outcome wins; a failed release is logged and
            // left to the lease expiry.
            tracing::warn!(
                account = %mask_account_number(key),
                error = %err,
                "failed to release account lock"
            );
        } else {
            tracing::debug!(account = %mask_account_number(key), "account lock released");
        }

        result
    }
}
