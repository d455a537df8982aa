pub mod interceptor;
pub mod local;
pub mod manager;
pub mod redis;

pub use interceptor::{LockInterceptor, LockTarget};
pub use local::LocalLockManager;
pub use manager::{LockHandle, LockManager};
pub use self::redis::RedisLockManager;
