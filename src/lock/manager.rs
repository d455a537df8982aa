use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Proof of an exclusive hold on a named lock.
///
/// The token is generated per acquisition and checked on release, so a
/// handle whose lease already expired (and whose key was taken over by
/// another holder) can never release the new holder's lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockHandle {
    key: String,
    token: String,
}

impl LockHandle {
    pub fn new(key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            token: token.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Named mutual exclusion.
///
/// `acquire` blocks up to `wait_timeout` for the key and fails with
/// `AppError::LockBusy` once the wait is exhausted. `lease_timeout` bounds
/// how long a crashed holder can keep the key: a safety net, not a
/// correctness mechanism. `release` is a no-op when the handle no longer
/// owns the key.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LockManager: Send + Sync {
    async fn acquire(
        &self,
        key: &str,
        wait_timeout: Duration,
        lease_timeout: Duration,
    ) -> Result<LockHandle>;

    async fn release(&self, handle: LockHandle) -> Result<()>;
}
