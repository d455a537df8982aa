use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Account;

/// Storage interface for accounts. The engine and lifecycle services only
/// see this trait, so tests can substitute in-memory or mock stores.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Inserts the account or updates it in place when the id exists.
    async fn save(&self, account: &Account) -> Result<Account>;

    async fn find_by_number(&self, account_number: &str) -> Result<Option<Account>>;

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Account>>;

    async fn count_by_user_id(&self, user_id: Uuid) -> Result<i64>;

    /// Highest allocated account number, used for sequential allocation.
    async fn latest_account_number(&self) -> Result<Option<String>>;
}

/// PostgreSQL-backed account store.
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn save(&self, account: &Account) -> Result<Account> {
        let row = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, account_number, user_id, status, balance,
                                  registered_at, unregistered_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE
            SET status = EXCLUDED.status,
                balance = EXCLUDED.balance,
                unregistered_at = EXCLUDED.unregistered_at,
                updated_at = EXCLUDED.updated_at
            RETURNING id, account_number, user_id, status, balance,
                      registered_at, unregistered_at, created_at, updated_at
            "#,
        )
        .bind(account.id)
        .bind(&account.account_number)
        .bind(account.user_id)
        .bind(account.status)
        .bind(account.balance)
        .bind(account.registered_at)
        .bind(account.unregistered_at)
        .bind(account.created_at)
        .bind(account.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }

    async fn find_by_number(&self, account_number: &str) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, account_number, user_id, status, balance,
                   registered_at, unregistered_at, created_at, updated_at
            FROM accounts
            WHERE account_number = $1
            "#,
        )
        .bind(account_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Account>> {
        let rows = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, account_number, user_id, status, balance,
                   registered_at, unregistered_at, created_at, updated_at
            FROM accounts
            WHERE user_id = $1
            ORDER BY account_number
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows)
    }

    async fn count_by_user_id(&self, user_id: Uuid) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM accounts
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row.0)
    }

    async fn latest_account_number(&self) -> Result<Option<String>> {
        // Account numbers are fixed-width digits, so lexicographic max is
        // the numeric max.
        let row: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT account_number
            FROM accounts
            ORDER BY account_number DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row.map(|r| r.0))
    }
}
