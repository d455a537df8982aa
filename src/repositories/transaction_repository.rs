use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Transaction;

/// Append-only store for ledger entries. Entries are immutable once
/// written; there is deliberately no update operation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn save(&self, transaction: &Transaction) -> Result<Transaction>;

    /// Looks up an entry by its public 32-character token.
    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Transaction>>;

    async fn find_by_account_id(&self, account_id: Uuid) -> Result<Vec<Transaction>>;
}

/// PostgreSQL-backed transaction store.
pub struct PostgresTransactionRepository {
    pool: PgPool,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn save(&self, transaction: &Transaction) -> Result<Transaction> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (id, transaction_id, account_id, account_number, type,
                                      result, amount, balance_snapshot, transacted_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, transaction_id, account_id, account_number, type,
                      result, amount, balance_snapshot, transacted_at, created_at
            "#,
        )
        .bind(transaction.id)
        .bind(&transaction.transaction_id)
        .bind(transaction.account_id)
        .bind(&transaction.account_number)
        .bind(transaction.transaction_type)
        .bind(transaction.result)
        .bind(transaction.amount)
        .bind(transaction.balance_snapshot)
        .bind(transaction.transacted_at)
        .bind(transaction.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }

    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Transaction>> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, transaction_id, account_id, account_number, type,
                   result, amount, balance_snapshot, transacted_at, created_at
            FROM transactions
            WHERE transaction_id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }

    async fn find_by_account_id(&self, account_id: Uuid) -> Result<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, transaction_id, account_id, account_number, type,
                   result, amount, balance_snapshot, transacted_at, created_at
            FROM transactions
            WHERE account_id = $1
            ORDER BY transacted_at DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows)
    }
}
