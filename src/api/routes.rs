use axum::{
    routing::{delete, get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use super::handlers;
use crate::config::LockSettings;
use crate::lock::{LockInterceptor, LockManager, RedisLockManager};
use crate::repositories::{
    AccountRepository, AccountUserRepository, PostgresAccountRepository,
    PostgresAccountUserRepository, PostgresTransactionRepository, TransactionRepository,
};
use crate::services::{AccountService, TransactionService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub redis_client: redis::Client,
    pub transaction_service: Arc<TransactionService>,
    pub account_service: Arc<AccountService>,
    pub lock: Arc<LockInterceptor>,
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(pool: PgPool, redis_client: redis::Client, lock_settings: &LockSettings) -> Self {
        let account_repository: Arc<dyn AccountRepository> =
            Arc::new(PostgresAccountRepository::new(pool.clone()));
        let transaction_repository: Arc<dyn TransactionRepository> =
            Arc::new(PostgresTransactionRepository::new(pool.clone()));
        let account_user_repository: Arc<dyn AccountUserRepository> =
            Arc::new(PostgresAccountUserRepository::new(pool.clone()));

        let transaction_service = Arc::new(TransactionService::new(
            transaction_repository,
            account_repository.clone(),
            account_user_repository.clone(),
        ));
        let account_service = Arc::new(AccountService::new(
            account_repository,
            account_user_repository,
        ));

        let manager: Arc<dyn LockManager> =
            Arc::new(RedisLockManager::new(redis_client.clone(), lock_settings));
        let lock = Arc::new(LockInterceptor::new(
            manager,
            Duration::from_millis(lock_settings.wait_timeout_ms),
            Duration::from_millis(lock_settings.lease_timeout_ms),
        ));

        Self {
            pool,
            redis_client,
            transaction_service,
            account_service,
            lock,
            metrics_handle: None,
        }
    }

    /// Adds metrics handle to the state.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }
}

/// Creates the main API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/live", get(handlers::liveness_check))
        // Metrics endpoint
        .route("/metrics", get(handlers::metrics_endpoint))
        // Transaction endpoints
        .route("/transaction/use", post(handlers::use_balance))
        .route("/transaction/cancel", post(handlers::cancel_balance))
        .route("/transaction/:transaction_id", get(handlers::query_transaction))
        // Account endpoints
        .route("/account", post(handlers::create_account))
        .route("/account", delete(handlers::unregister_account))
        .route("/account", get(handlers::list_accounts))
        .with_state(state)
}
